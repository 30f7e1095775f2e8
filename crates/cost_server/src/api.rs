//! HTTP surface: HTML form plus a small JSON API

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use insurance_core::{FeatureSchema, RawRecord, UnseenCategory};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::errors::ServeError;
use crate::html::{render_page, Outcome};
use crate::service::{HealthInfo, PredictionService};

pub type SharedService = Arc<PredictionService>;

/// JSON request body; numbers may be sent as JSON numbers or strings
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    pub age: Option<Value>,
    pub sex: Option<Value>,
    pub bmi: Option<Value>,
    pub children: Option<Value>,
    pub smoker: Option<Value>,
    pub region: Option<Value>,
}

impl From<PredictRequest> for RawRecord {
    fn from(req: PredictRequest) -> Self {
        RawRecord {
            age: field_text(req.age),
            sex: field_text(req.sex),
            bmi: field_text(req.bmi),
            children: field_text(req.children),
            smoker: field_text(req.smoker),
            region: field_text(req.region),
        }
    }
}

fn field_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Two fractional digits, no grouping
    pub prediction: String,
    pub value: f64,
    pub unseen_categories: Vec<UnseenCategory>,
}

pub fn build_router(service: SharedService) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/predict", post(handle_form_predict))
        .route("/api/predict", post(handle_api_predict))
        .route("/api/health", get(handle_health))
        .route("/api/schema", get(handle_schema))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn handle_index(State(service): State<SharedService>) -> Html<String> {
    Html(render_page(service.schema(), &RawRecord::default(), None))
}

async fn handle_form_predict(
    State(service): State<SharedService>,
    form: Result<Form<RawRecord>, FormRejection>,
) -> (StatusCode, Html<String>) {
    let raw = match form {
        Ok(Form(raw)) => raw,
        Err(rejection) => {
            let message = rejection.body_text();
            let page = render_page(service.schema(), &RawRecord::default(), Some(Outcome::Error(&message)));
            return (StatusCode::BAD_REQUEST, Html(page));
        }
    };

    match service.predict_raw(raw.clone()) {
        Ok(prediction) => {
            let page = render_page(service.schema(), &raw, Some(Outcome::Prediction(&prediction)));
            (StatusCode::OK, Html(page))
        }
        Err(err) => {
            let err = ServeError::from(err);
            let message = err.to_string();
            let page = render_page(service.schema(), &raw, Some(Outcome::Error(&message)));
            (err.status(), Html(page))
        }
    }
}

async fn handle_api_predict(
    State(service): State<SharedService>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ServeError> {
    let Json(request) = body.map_err(|rejection| ServeError::BadRequest(rejection.body_text()))?;
    let prediction = service.predict_raw(request.into())?;

    Ok(Json(PredictResponse {
        prediction: prediction.formatted(),
        value: prediction.value,
        unseen_categories: prediction.unseen_categories,
    }))
}

async fn handle_health(State(service): State<SharedService>) -> Json<HealthInfo> {
    Json(service.health())
}

async fn handle_schema(State(service): State<SharedService>) -> Json<FeatureSchema> {
    Json(service.schema().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_numbers_become_field_text() {
        let request: PredictRequest = serde_json::from_value(json!({
            "age": 19,
            "bmi": 27.9,
            "children": "0",
            "sex": "female",
            "smoker": null
        }))
        .unwrap();
        let raw = RawRecord::from(request);

        assert_eq!(raw.age.as_deref(), Some("19"));
        assert_eq!(raw.bmi.as_deref(), Some("27.9"));
        assert_eq!(raw.children.as_deref(), Some("0"));
        assert_eq!(raw.smoker, None);
        assert_eq!(raw.region, None);
    }
}
