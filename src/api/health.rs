use axum::Json;
use chrono::{SecondsFormat, Utc};

use crate::core::types::HealthResponse;

/// Liveness check; does not touch the store
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "API is healthy".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
