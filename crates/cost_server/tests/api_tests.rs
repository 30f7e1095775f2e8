//! Router tests against a hand-built artifact pair

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use insurance_core::{
    ArtifactPair, CategoricalField, CategoryLevels, EvaluationMetrics, FeatureSchema, Hyperparams,
    LinearModel, Regressor, StandardScaler,
};
use insurance_server::{build_router, PredictionService};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BODY_LIMIT: usize = 1 << 20;

fn artifacts() -> ArtifactPair {
    let levels = |field, values: &[&str]| CategoryLevels {
        field,
        levels: values.iter().map(|v| v.to_string()).collect(),
    };
    let schema = FeatureSchema::from_levels(vec![
        levels(CategoricalField::Sex, &["female", "male"]),
        levels(CategoricalField::Smoker, &["no", "yes"]),
        levels(
            CategoricalField::Region,
            &["northeast", "northwest", "southeast", "southwest"],
        ),
    ])
    .unwrap();

    let scaler = StandardScaler::from_statistics(
        vec!["age".into(), "bmi".into(), "children".into()],
        vec![39.207025, 30.663397, 1.094918],
        vec![14.044709, 6.095908, 1.205042],
    )
    .unwrap();

    ArtifactPair::new(
        schema,
        Hyperparams::Ridge { alpha: 1.0 },
        Regressor::Ridge(LinearModel {
            intercept: 8_465.62,
            coefficients: vec![3_614.97, 2_036.23, 516.89, -18.59, 23_650.7, -370.68, -657.86, -809.8],
        }),
        EvaluationMetrics::default(),
        scaler,
    )
    .unwrap()
}

/// Router backed by artifacts that went through save + load
fn app() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    artifacts().save(dir.path()).unwrap();
    let service = PredictionService::load(dir.path()).unwrap();
    (build_router(Arc::new(service)), dir)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn example_json() -> Value {
    json!({
        "age": 19,
        "sex": "female",
        "bmi": 27.9,
        "children": 0,
        "smoker": "yes",
        "region": "southwest"
    })
}

#[tokio::test]
async fn index_serves_form() {
    let (app, _dir) = app();
    let (status, body) = send(app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<form method=\"post\" action=\"/predict\">"));
    assert!(body.contains("name=\"region\""));
}

#[tokio::test]
async fn api_predicts_example_record() {
    let (app, _dir) = app();
    let (status, body) = send(app, post_json("/api/predict", example_json())).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let response: Value = serde_json::from_str(&body).unwrap();
    let prediction = response["prediction"].as_str().unwrap();
    let (_, frac) = prediction.split_once('.').unwrap();
    assert_eq!(frac.len(), 2);
    assert!(response["value"].as_f64().unwrap() > 0.0);
    assert_eq!(response["unseen_categories"], json!([]));
}

#[tokio::test]
async fn api_matches_in_memory_prediction() {
    let (app, _dir) = app();
    let (_, body) = send(app, post_json("/api/predict", example_json())).await;
    let response: Value = serde_json::from_str(&body).unwrap();

    let record = insurance_core::Record {
        age: 19,
        sex: "female".into(),
        bmi: 27.9,
        children: 0,
        smoker: "yes".into(),
        region: "southwest".into(),
    };
    let expected = artifacts().predict(&record).unwrap();
    assert_eq!(response["value"].as_f64().unwrap().to_bits(), expected.value.to_bits());
}

#[tokio::test]
async fn api_reports_unseen_region() {
    let (app, _dir) = app();
    let mut body = example_json();
    body["region"] = json!("atlantis");

    let (status, body) = send(app, post_json("/api/predict", body)).await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        response["unseen_categories"],
        json!([{ "field": "region", "value": "atlantis" }])
    );
}

#[tokio::test]
async fn api_rejects_missing_and_invalid_fields() {
    let (app, _dir) = app();

    let mut missing = example_json();
    missing.as_object_mut().unwrap().remove("age");
    let (status, body) = send(app.clone(), post_json("/api/predict", missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("age"), "{body}");

    let mut negative = example_json();
    negative["children"] = json!(-1);
    let (status, body) = send(app.clone(), post_json("/api/predict", negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("children"), "{body}");

    let mut zero_bmi = example_json();
    zero_bmi["bmi"] = json!(0.0);
    let (status, body) = send(app.clone(), post_json("/api/predict", zero_bmi)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("bmi"), "{body}");

    let request = Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_rejects_out_of_range_values() {
    let (app, _dir) = app();

    for (field, value) in [("bmi", json!(1e308)), ("age", json!(200)), ("children", json!(1000))] {
        let mut body = example_json();
        body[field] = value;
        let (status, body) = send(app.clone(), post_json("/api/predict", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}: {body}");
        assert!(body.contains(field), "{body}");
    }
}

#[tokio::test]
async fn form_renders_grouped_prediction() {
    let (app, _dir) = app();
    let (status, body) = send(
        app,
        post_form("age=19&sex=female&bmi=27.9&children=0&smoker=yes&region=southwest"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Predicted charges: $"), "{body}");
    assert!(body.contains("value=\"27.9\""));
}

#[tokio::test]
async fn form_with_bad_field_is_rejected() {
    let (app, _dir) = app();
    let (status, body) = send(
        app,
        post_form("age=19&sex=female&bmi=abc&children=0&smoker=yes&region=southwest"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("class=\"error\""));
    assert!(body.contains("bmi"));
    assert!(!body.contains("Predicted charges"));
}

#[tokio::test]
async fn health_and_schema() {
    let (app, _dir) = app();

    let (status, body) = send(app.clone(), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["family"], "ridge");
    assert_eq!(health["columns"].as_array().unwrap().len(), 8);

    let (status, body) = send(app, get("/api/schema")).await;
    assert_eq!(status, StatusCode::OK);
    let schema: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(schema["columns"][3], "sex_male");
    assert_eq!(schema["columns"][7], "region_southwest");
}

#[test]
fn load_rejects_foreign_scaler() {
    let dir = TempDir::new().unwrap();
    artifacts().save(dir.path()).unwrap();

    let other = StandardScaler::from_statistics(
        vec!["age".into(), "bmi".into(), "children".into()],
        vec![40.0, 30.0, 1.0],
        vec![14.0, 6.0, 1.2],
    )
    .unwrap();
    let json = insurance_core::serde_canon::to_canonical_json(&other).unwrap();
    std::fs::write(dir.path().join("scaler.json"), json).unwrap();

    assert!(PredictionService::load(dir.path()).is_err());
}

#[test]
fn load_fails_without_artifacts() {
    let dir = TempDir::new().unwrap();
    assert!(PredictionService::load(dir.path()).is_err());
}
