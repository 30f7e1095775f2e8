//! Loaded model/scaler pair shared by all request handlers

use insurance_core::{ArtifactPair, CoreError, FeatureSchema, Prediction, RawRecord, Record};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Read-only prediction service; construct once at startup
#[derive(Debug)]
pub struct PredictionService {
    artifacts: ArtifactPair,
    source: PathBuf,
}

/// Body of `GET /api/health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthInfo {
    pub status: &'static str,
    pub version: &'static str,
    pub family: String,
    pub hyperparams: String,
    pub columns: Vec<String>,
    pub trained_at: i64,
    pub test_r2: f64,
}

impl PredictionService {
    /// Load and verify the artifact pair in `dir`
    pub fn load(dir: &Path) -> Result<Self, CoreError> {
        let artifacts = ArtifactPair::load(dir)?;
        let model = artifacts.model();
        info!(
            "loaded {} model from {} ({} columns, test r2={:.4})",
            model.regressor.family(),
            dir.display(),
            model.schema.columns().len(),
            model.metrics.test_r2
        );
        Ok(Self {
            artifacts,
            source: dir.to_path_buf(),
        })
    }

    pub fn from_artifacts(artifacts: ArtifactPair) -> Self {
        Self {
            artifacts,
            source: PathBuf::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.artifacts.schema()
    }

    pub fn predict(&self, record: &Record) -> Result<Prediction, CoreError> {
        self.artifacts.predict(record)
    }

    /// Validate untyped form fields, then predict
    pub fn predict_raw(&self, raw: RawRecord) -> Result<Prediction, CoreError> {
        let record = Record::try_from(raw)?;
        self.predict(&record)
    }

    pub fn health(&self) -> HealthInfo {
        let model = self.artifacts.model();
        HealthInfo {
            status: "ok",
            version: insurance_core::VERSION,
            family: model.regressor.family().to_string(),
            hyperparams: model.hyperparams.to_string(),
            columns: model.schema.columns().to_vec(),
            trained_at: model.created_at,
            test_r2: model.metrics.test_r2,
        }
    }
}
