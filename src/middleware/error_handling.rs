//! # Error Formatting Middleware
//!
//! The single boundary where failures are logged and turned into the final
//! error envelope. Handlers and stages render a production envelope through
//! `IntoResponse`; this layer finds the original [`CatalogError`] in the response
//! extensions, logs it, and in development mode re-renders it with a `stack`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use tracing::{error, warn};

use crate::core::error::CatalogError;

/// Settings for the error formatting layer
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorFormatting {
    /// Attach the debug rendering of the error as `error.stack`
    pub include_stack: bool,
}

pub async fn format_errors(
    State(formatting): State<ErrorFormatting>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let Some(err) = response.extensions().get::<CatalogError>().cloned() else {
        return response;
    };

    let status = err.status_code();
    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            error_type = err.error_type(),
            error = %err,
            "Request failed"
        );
    } else {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            error_type = err.error_type(),
            error = %err,
            "Request rejected"
        );
    }

    if formatting.include_stack {
        let mut formatted = err.to_response(true);
        formatted.extensions_mut().insert(err);
        return formatted;
    }

    response
}

/// Turn a handler panic into an `Internal` error response
///
/// Used with `tower_http::catch_panic::CatchPanicLayer`, inside
/// [`format_errors`] so the failure is logged like any other.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Internal Server Error".to_string()
    };

    CatalogError::internal(message).into_response()
}
