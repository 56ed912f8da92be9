//! Request logging middleware.
//!
//! Emits one structured event per request and tags every response with an
//! `x-request-id` header, reusing the caller's id when one was sent.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, Instrument};

use crate::observability::logging::CorrelationId;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub async fn log_requests(mut request: Request, next: Next) -> Response {
    let start_time = Instant::now();

    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| CorrelationId::from_string(v.to_string()))
        .unwrap_or_default();

    let method = request.method().clone();
    let uri = request.uri().clone();
    request.extensions_mut().insert(request_id.clone());

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        duration_ms = start_time.elapsed().as_millis() as u64,
        "Request processed"
    );

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}
