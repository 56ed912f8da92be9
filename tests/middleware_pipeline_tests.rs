//! # Middleware Pipeline Integration Tests
//!
//! Mounts stage pipelines on small routers to check stage ordering, early
//! termination, body hand-off to handlers and the interaction with the error
//! formatting layer.

use async_trait::async_trait;
use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    middleware,
    routing::post,
    Json, Router,
};
use axum_test::TestServer;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

use product_catalog_api::auth::ApiKeyAuthenticator;
use product_catalog_api::catalog::ValidationMode;
use product_catalog_api::core::error::{CatalogError, CatalogResult};
use product_catalog_api::middleware::{
    format_errors, run_pipeline, ApiKeyStage, ErrorFormatting, JsonBody, JsonBodyStage,
    ProductValidationStage, Stage, StageContext, StagePipeline,
};

/// Test stage that records its execution and optionally fails
#[derive(Debug)]
struct RecordingStage {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    fail_with: Option<CatalogError>,
}

impl RecordingStage {
    fn new(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name: name.to_string(),
            log: log.clone(),
            fail_with: None,
        }
    }

    fn failing(mut self, error: CatalogError) -> Self {
        self.fail_with = Some(error);
        self
    }
}

#[async_trait]
impl Stage for RecordingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, _context: &mut StageContext) -> CatalogResult<()> {
        self.log.lock().push(self.name.clone());
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

async fn echo(JsonBody(body): JsonBody) -> Json<Value> {
    Json(json!({ "received": body }))
}

fn router_with(pipeline: StagePipeline) -> TestServer {
    let app = Router::new()
        .route(
            "/echo",
            post(echo).route_layer(middleware::from_fn_with_state(
                Arc::new(pipeline),
                run_pipeline,
            )),
        )
        .layer(middleware::from_fn_with_state(
            ErrorFormatting::default(),
            format_errors,
        ));
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_stages_run_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let pipeline = StagePipeline::new(1024)
        .with_stage(RecordingStage::new("first", &log))
        .with_stage(JsonBodyStage)
        .with_stage(RecordingStage::new("second", &log));
    assert_eq!(pipeline.stage_names(), vec!["first", "json_body", "second"]);

    let server = router_with(pipeline);
    let response = server.post("/echo").json(&json!({ "a": 1 })).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "received": { "a": 1 } }));
    assert_eq!(*log.lock(), vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn test_pipeline_stops_at_first_error() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let pipeline = StagePipeline::new(1024)
        .with_stage(RecordingStage::new("first", &log))
        .with_stage(
            RecordingStage::new("gate", &log).failing(CatalogError::auth("API key is required")),
        )
        .with_stage(RecordingStage::new("never", &log));

    let server = router_with(pipeline);
    let response = server.post("/echo").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "success": false, "error": { "message": "API key is required" } })
    );
    assert_eq!(*log.lock(), vec!["first".to_string(), "gate".to_string()]);
}

#[tokio::test]
async fn test_handler_without_decoding_stage_is_internal_error() {
    let pipeline = StagePipeline::new(1024);
    let server = router_with(pipeline);

    let response = server.post("/echo").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_authentication_precedes_validation() {
    let pipeline = StagePipeline::new(1024)
        .with_stage(JsonBodyStage)
        .with_stage(ApiKeyStage::new(ApiKeyAuthenticator::new(
            "x-api-key",
            "secret",
        )))
        .with_stage(ProductValidationStage::new(ValidationMode::Full));
    let server = router_with(pipeline);

    let response = server.post("/echo").json(&json!({ "name": "" })).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .post("/echo")
        .add_header(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static("secret"),
        )
        .json(&json!({ "name": "" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/echo")
        .add_header(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_static("secret"),
        )
        .json(&json!({
            "name": "Pen",
            "description": "Blue ink pen",
            "price": 1.5,
            "category": "Office",
            "inStock": true
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["received"]["name"], "Pen");
}

#[tokio::test]
async fn test_partial_validation_accepts_empty_body() {
    let pipeline = StagePipeline::new(1024)
        .with_stage(JsonBodyStage)
        .with_stage(ProductValidationStage::new(ValidationMode::Partial));
    let server = router_with(pipeline);

    let response = server.post("/echo").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "received": {} }));
}
