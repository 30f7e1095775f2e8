//! Persisted training artifacts
//!
//! A training run produces three files in one directory:
//!
//! - `model.json`: canonical JSON [`ModelArtifact`] (feature schema with the
//!   exact column list, regressor, hyperparameters, metrics, and the BLAKE3
//!   hash of the scaler it was trained with)
//! - `scaler.json`: canonical JSON [`StandardScaler`]
//! - `model.hash`: hex BLAKE3 hash of `model.json`
//!
//! [`ArtifactPair::load`] checks both hashes, so a model is never served with
//! a scaler from a different run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{CoreError, Result};
use crate::features::FeatureSchema;
use crate::model::{Hyperparams, Regressor};
use crate::scaler::StandardScaler;
use crate::serde_canon::{hash_canonical_hex, hash_hex, to_canonical_json};

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const MODEL_HASH_FILE: &str = "model.hash";

/// Bumped whenever the artifact layout changes incompatibly
pub const FORMAT_VERSION: u32 = 1;

/// Scores recorded for the selected model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Mean squared error averaged over cross-validation folds
    pub cv_mse: f64,
    pub test_rmse: f64,
    pub test_mae: f64,
    pub test_r2: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl EvaluationMetrics {
    /// Every score must be a finite number
    pub fn validate(&self) -> Result<()> {
        let scores = [
            ("cv_mse", self.cv_mse),
            ("test_rmse", self.test_rmse),
            ("test_mae", self.test_mae),
            ("test_r2", self.test_r2),
        ];
        for (name, value) in scores {
            if !value.is_finite() {
                return Err(CoreError::Model(format!("metric {name} is not finite: {value}")));
            }
        }
        Ok(())
    }
}

/// Everything the serving process needs besides the scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub created_at: i64,
    pub schema: FeatureSchema,
    pub hyperparams: Hyperparams,
    pub regressor: Regressor,
    pub metrics: EvaluationMetrics,
    /// Hex BLAKE3 hash of the canonical scaler JSON
    pub scaler_hash: String,
}

/// Paths written by [`ArtifactPair::save`]
#[derive(Debug, Clone)]
pub struct SavedArtifacts {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub hash_path: PathBuf,
    pub model_hash: String,
}

/// A model and the scaler it was trained with
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPair {
    model: ModelArtifact,
    scaler: StandardScaler,
}

impl ArtifactPair {
    /// Bind a freshly trained regressor to its schema and scaler
    pub fn new(
        schema: FeatureSchema,
        hyperparams: Hyperparams,
        regressor: Regressor,
        metrics: EvaluationMetrics,
        scaler: StandardScaler,
    ) -> Result<Self> {
        let model = ModelArtifact {
            format_version: FORMAT_VERSION,
            created_at: chrono::Utc::now().timestamp(),
            schema,
            hyperparams,
            regressor,
            metrics,
            scaler_hash: hash_canonical_hex(&scaler)?,
        };
        Self::from_parts(model, scaler)
    }

    /// Pair an existing model artifact with a scaler, verifying they belong together
    pub fn from_parts(model: ModelArtifact, scaler: StandardScaler) -> Result<Self> {
        let pair = Self { model, scaler };
        pair.verify()?;
        Ok(pair)
    }

    fn verify(&self) -> Result<()> {
        let model = &self.model;

        if model.format_version != FORMAT_VERSION {
            return Err(CoreError::ArtifactMismatch(format!(
                "unsupported artifact format version {} (expected {FORMAT_VERSION})",
                model.format_version
            )));
        }

        model.schema.validate()?;
        self.scaler.validate()?;
        model.metrics.validate()?;

        let columns = model.schema.columns();
        model.regressor.validate(columns.len())?;

        if model.hyperparams.family() != model.regressor.family() {
            return Err(CoreError::ArtifactMismatch(format!(
                "hyperparameters are for {} but the regressor is {}",
                model.hyperparams.family(),
                model.regressor.family()
            )));
        }

        if self.scaler.columns() != model.schema.numeric_columns().as_slice() {
            return Err(CoreError::ArtifactMismatch(format!(
                "scaler columns {:?} do not match numeric columns {:?}",
                self.scaler.columns(),
                model.schema.numeric_columns()
            )));
        }
        self.scaler.indices_in(columns)?;

        let actual = hash_canonical_hex(&self.scaler)?;
        if actual != model.scaler_hash {
            return Err(CoreError::ArtifactMismatch(format!(
                "scaler hash {actual} does not match the hash recorded in the model ({})",
                model.scaler_hash
            )));
        }

        Ok(())
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.model.schema
    }

    pub fn regressor(&self) -> &Regressor {
        &self.model.regressor
    }

    /// Write `model.json`, `scaler.json` and `model.hash` into `dir`
    pub fn save(&self, dir: &Path) -> Result<SavedArtifacts> {
        fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;

        let model_json = to_canonical_json(&self.model)?;
        let scaler_json = to_canonical_json(&self.scaler)?;
        let model_hash = hash_hex(&model_json);

        let model_path = dir.join(MODEL_FILE);
        let scaler_path = dir.join(SCALER_FILE);
        let hash_path = dir.join(MODEL_HASH_FILE);

        // hash goes last; a partially written pair never verifies
        write_file(&scaler_path, &scaler_json)?;
        write_file(&model_path, &model_json)?;
        write_file(&hash_path, &model_hash)?;

        info!(
            model = %model_path.display(),
            scaler = %scaler_path.display(),
            hash = %model_hash,
            "saved artifact pair"
        );

        Ok(SavedArtifacts {
            model_path,
            scaler_path,
            hash_path,
            model_hash,
        })
    }

    /// Load and verify an artifact pair from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let model_path = dir.join(MODEL_FILE);
        let scaler_path = dir.join(SCALER_FILE);
        let hash_path = dir.join(MODEL_HASH_FILE);

        let model_json = read_file(&model_path)?;
        let expected = read_file(&hash_path)?.trim().to_string();
        let actual = hash_hex(&model_json);
        if expected != actual {
            return Err(CoreError::HashMismatch {
                artifact: model_path.display().to_string(),
                expected,
                actual,
            });
        }

        let model: ModelArtifact = serde_json::from_str(&model_json)?;
        let scaler: StandardScaler = serde_json::from_str(&read_file(&scaler_path)?)?;
        debug!(family = %model.regressor.family(), "parsed artifacts, verifying pair");

        Self::from_parts(model, scaler)
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CoreError::io(path, e))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| CoreError::io(path, e))
}
