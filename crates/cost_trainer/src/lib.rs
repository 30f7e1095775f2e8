//! Insurance Cost Trainer
//!
//! Offline model selection for the insurance cost predictor. Loads the CSV
//! dataset, fits the feature schema and standard scaler on the training
//! split, grid-searches each regressor family with k-fold cross-validation,
//! and produces the artifact pair consumed by the prediction server.

pub mod boosting;
pub mod cart;
pub mod cv;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod grid;
pub mod linear;
pub mod metrics;
pub mod scaling;
pub mod trainer;

pub use boosting::{BoostingConfig, GradientBooster};
pub use cart::{CartBuilder, TreeConfig};
pub use cv::{cross_val_mse, KFold};
pub use dataset::{Dataset, TargetSummary, CSV_COLUMNS};
pub use deterministic::LcgRng;
pub use errors::{Result, TrainerError};
pub use scaling::fit_scaler;
pub use grid::{default_grid, FamilyResult, GridPoint, GridSearch};
pub use trainer::{fit_regressor, select_winner, FamilyReport, Trainer, TrainingOutcome, TrainingParams};

use std::path::Path;

/// Load `path` and run a full training job
pub fn train_from_csv<P: AsRef<Path>>(path: P, params: TrainingParams) -> anyhow::Result<TrainingOutcome> {
    let dataset = Dataset::from_csv(path)?;
    Ok(Trainer::new(params).train(dataset)?)
}

/// Version of the trainer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
