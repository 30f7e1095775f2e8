//! Error types for the training job

use insurance_core::CoreError;
use thiserror::Error;

/// Errors returned by the training job.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("training error: {0}")]
    Training(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, TrainerError>;
