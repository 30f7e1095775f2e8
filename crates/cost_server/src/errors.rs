use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use insurance_core::CoreError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the prediction server
#[derive(Debug, Error)]
pub enum ServeError {
    /// The request was malformed; nothing reached the model
    #[error("{0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServeError::Config(_) | ServeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ServeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingField(_) | CoreError::InvalidField { .. } => {
                ServeError::BadRequest(err.to_string())
            }
            other => ServeError::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        }
        let payload = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, payload).into_response()
    }
}
