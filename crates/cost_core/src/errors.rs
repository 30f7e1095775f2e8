//! Error types for the insurance cost core

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating records, encoding features, or loading artifacts
#[derive(Error, Debug)]
pub enum CoreError {
    /// A request or dataset row did not carry a required field
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field was present but could not be parsed or is out of range
    #[error("invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The feature schema is empty or internally inconsistent
    #[error("feature schema error: {0}")]
    Schema(String),

    /// Scaler statistics are malformed or do not fit the column layout
    #[error("scaler error: {0}")]
    Scaler(String),

    /// Regressor structure does not match the feature layout
    #[error("model error: {0}")]
    Model(String),

    /// Unknown regressor family name
    #[error("unknown model family: {0}")]
    UnknownFamily(String),

    /// Model and scaler were not produced by the same training run
    #[error("artifact mismatch: {0}")]
    ArtifactMismatch(String),

    /// Stored hash does not match the artifact contents
    #[error("hash mismatch for {artifact}: expected {expected}, got {actual}")]
    HashMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    /// Reading or writing an artifact failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
