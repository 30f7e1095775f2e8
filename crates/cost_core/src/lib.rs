//! Insurance Cost Core
//!
//! Shared contract between the training job and the prediction server: the
//! record type, one-hot encoding with training-time column alignment, the
//! standard scaler, the regressor families, and the persisted artifact pair.
//!
//! Modules:
//! - `record`: Fixed-shape insured-person record and boundary validation
//! - `features`: Indicator encoding, feature schema and column alignment
//! - `scaler`: Standard scaling (fitting behind the `training` feature)
//! - `model`: Ridge, regression tree and boosted-tree regressors
//! - `artifacts`: Model/scaler persistence with hash-verified pairing
//! - `pipeline`: Single-record inference and output formatting
//! - `serde_canon`: Canonical JSON and BLAKE3 hashing

pub mod artifacts;
pub mod errors;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod record;
pub mod scaler;
pub mod serde_canon;

pub use artifacts::{ArtifactPair, EvaluationMetrics, ModelArtifact, SavedArtifacts, FORMAT_VERSION};
pub use errors::{CoreError, Result};
pub use features::{align, encode_record, AlignedRow, CategoryLevels, EncodedRecord, FeatureSchema, UnseenCategory};
pub use model::{BoostedTrees, Hyperparams, LinearModel, ModelFamily, Node, Regressor, Tree};
pub use pipeline::{format_prediction, group_thousands, Prediction};
pub use record::{CategoricalField, NumericField, RawRecord, Record, MAX_AGE, MAX_BMI, MAX_CHILDREN};
pub use scaler::StandardScaler;

/// Crate version string recorded in logs and health reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
