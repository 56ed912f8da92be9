//! # Error Handling Module
//!
//! Every failure the catalog service can produce is a variant of [`CatalogError`].
//! Each variant carries a human readable message and maps to exactly one HTTP
//! status code, so handlers and pipeline stages only need to return
//! `CatalogResult<T>` and let `?` carry the failure to the response boundary.
//!
//! ## Response Envelope
//!
//! Errors render as:
//!
//! ```json
//! { "success": false, "error": { "message": "Product with ID 999 not found" } }
//! ```
//!
//! The rendered response also carries the original error in its extensions so the
//! outer error formatting layer can log it and, in development mode, attach a
//! `stack` field. See [`crate::middleware::error_handling`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Result type used throughout the service
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error taxonomy for the catalog service
///
/// The `#[error("...")]` attribute renders only the message, which is exactly what
/// clients see in the envelope.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// Unknown product id or unmatched route
    #[error("{message}")]
    NotFound { message: String },

    /// Malformed input: bad fields, bad ids, bad query strings, bad JSON
    #[error("{message}")]
    Validation { message: String },

    /// Missing or wrong API key
    #[error("{message}")]
    Authentication { message: String },

    /// Request body exceeded the configured limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Unclassified failures
    #[error("{message}")]
    Internal { message: String },

    /// Invalid configuration detected at startup
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl CatalogError {
    /// Create a not found error with a custom message
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an authentication error with a custom message
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a payload too large error with a custom message
    pub fn payload_too_large<S: Into<String>>(message: S) -> Self {
        Self::PayloadTooLarge {
            message: message.into(),
        }
    }

    /// Create an internal error with a custom message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Authentication { .. } => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine readable name of the variant, used as a log field
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation { .. } => "validation_error",
            Self::Authentication { .. } => "authentication_error",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::Internal { .. } => "internal_error",
            Self::Configuration { .. } => "configuration_error",
        }
    }

    /// Build the JSON error envelope, optionally including a stack rendering
    pub fn envelope(&self, include_stack: bool) -> ErrorEnvelope {
        let message = match self.to_string() {
            m if m.is_empty() => "Internal Server Error".to_string(),
            m => m,
        };

        ErrorEnvelope {
            success: false,
            error: ErrorBody {
                message,
                stack: include_stack.then(|| format!("{:#?}", self)),
            },
        }
    }

    /// Render the envelope as a response, used by both `IntoResponse` and the
    /// development mode formatter
    pub fn to_response(&self, include_stack: bool) -> Response {
        (self.status_code(), Json(self.envelope(include_stack))).into_response()
    }
}

/// Uniform error envelope sent for every non-2xx response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Configuration {
            message: format!("Failed to parse config: {}", err),
        }
    }
}

/// Render the production envelope and stash the error in the response
/// extensions for the error formatting layer.
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let mut response = self.to_response(false);
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(CatalogError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(CatalogError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(CatalogError::auth("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            CatalogError::payload_too_large("x").status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            CatalogError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_envelope_hides_stack_by_default() {
        let envelope = CatalogError::not_found("Product with ID 7 not found").envelope(false);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["message"], "Product with ID 7 not found");
        assert!(json["error"].get("stack").is_none());
    }

    #[test]
    fn test_envelope_with_stack() {
        let envelope = CatalogError::validation("bad").envelope(true);
        let stack = envelope.error.stack.unwrap();
        assert!(stack.contains("Validation"));
    }

    #[test]
    fn test_empty_internal_message_falls_back() {
        let envelope = CatalogError::internal("").envelope(false);
        assert_eq!(envelope.error.message, "Internal Server Error");
    }

    #[test]
    fn test_into_response_keeps_error_in_extensions() {
        let response = CatalogError::auth("API key is required").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.extensions().get::<CatalogError>(),
            Some(&CatalogError::auth("API key is required"))
        );
    }
}
