//! # Stage Pipeline
//!
//! Per-route request processing as an explicit, ordered list of stages. Each stage
//! inspects or enriches a [`StageContext`] and either lets the request continue
//! (`Ok(())`) or ends it with a [`CatalogError`]. The pipeline stops at the first
//! error; the handler only runs when every stage passed.
//!
//! The axum adapter [`run_pipeline`] buffers the request body (bounded by the
//! configured size limit), runs the stages, then hands the decoded JSON body to
//! the handler through the request extensions as a [`JsonBody`]. The server
//! mounts one adapter in front of the router to decode every body before
//! dispatch; the per-route adapters then start from that decoded value.

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, Method, Uri},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::core::error::{CatalogError, CatalogResult};

/// Everything a stage may look at or fill in
#[derive(Debug, Clone)]
pub struct StageContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Raw request body as received
    pub raw_body: Bytes,
    /// Decoded JSON body, set by the body decoding stage
    pub json: Option<Value>,
}

impl StageContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, raw_body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            raw_body,
            json: None,
        }
    }

    /// Header value as text, `None` when absent or not valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// One step of a per-route pipeline
#[async_trait]
pub trait Stage: Send + Sync + fmt::Debug {
    /// Stage name for logging
    fn name(&self) -> &str;

    /// Continue with `Ok(())` or stop the request with an error
    async fn process(&self, context: &mut StageContext) -> CatalogResult<()>;
}

/// Ordered list of stages executed before a handler
#[derive(Debug, Clone)]
pub struct StagePipeline {
    stages: Vec<Arc<dyn Stage>>,
    max_body_size: usize,
}

impl StagePipeline {
    pub fn new(max_body_size: usize) -> Self {
        Self {
            stages: Vec::new(),
            max_body_size,
        }
    }

    /// Append a stage; stages run in the order they were added
    pub fn with_stage<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Run every stage in order, stopping at the first error
    pub async fn execute(&self, context: &mut StageContext) -> CatalogResult<()> {
        let start_time = Instant::now();

        for stage in &self.stages {
            debug!(stage = stage.name(), "Executing stage");
            if let Err(error) = stage.process(context).await {
                debug!(stage = stage.name(), error = %error, "Stage stopped the request");
                return Err(error);
            }
        }

        debug!("Stage pipeline completed in {:?}", start_time.elapsed());
        Ok(())
    }
}

/// Axum middleware that runs a [`StagePipeline`] in front of a handler
pub async fn run_pipeline(
    State(pipeline): State<Arc<StagePipeline>>,
    request: Request,
    next: Next,
) -> CatalogResult<Response> {
    let (mut parts, body) = request.into_parts();

    let raw_body = axum::body::to_bytes(body, pipeline.max_body_size())
        .await
        .map_err(|err| {
            if err.into_inner().is::<http_body_util::LengthLimitError>() {
                CatalogError::payload_too_large("request entity too large")
            } else {
                CatalogError::validation("Failed to read request body")
            }
        })?;

    let mut context = StageContext::new(
        parts.method.clone(),
        parts.uri.clone(),
        parts.headers.clone(),
        raw_body,
    );
    // an outer pipeline may already have decoded the body
    context.json = parts.extensions.get::<JsonBody>().map(|body| body.0.clone());
    pipeline.execute(&mut context).await?;

    if let Some(json) = context.json {
        parts.extensions.insert(JsonBody(json));
    }

    let request = Request::from_parts(parts, Body::from(context.raw_body));
    Ok(next.run(request).await)
}

/// JSON body decoded by the pipeline, extracted by handlers
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequestParts<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JsonBody>()
            .cloned()
            .ok_or_else(|| CatalogError::internal("Request body was not decoded"))
    }
}
