//! Insurance Cost Prediction Server
//!
//! Serves a trained model/scaler pair over HTTP: an HTML form for people and
//! a JSON API for programs. The artifact pair is loaded and verified once at
//! startup and shared read-only by every request.

pub mod api;
pub mod config;
pub mod errors;
pub mod html;
pub mod server;
pub mod service;

pub use api::{build_router, PredictRequest, PredictResponse, SharedService};
pub use config::ServerConfig;
pub use errors::ServeError;
pub use server::{bind_listener, start_server};
pub use service::{HealthInfo, PredictionService};
