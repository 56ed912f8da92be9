//! Built-in pipeline stages for the product routes.

use async_trait::async_trait;
use axum::http::header::CONTENT_TYPE;
use serde_json::{Map, Value};

use crate::auth::ApiKeyAuthenticator;
use crate::catalog::validation::{validate_product, ValidationMode};
use crate::core::error::{CatalogError, CatalogResult};
use crate::middleware::pipeline::{Stage, StageContext};

/// Decodes the request body as JSON
///
/// An empty body, or one sent without a JSON content type, decodes to an empty
/// object. A JSON content type with unparseable content is a validation error.
#[derive(Debug, Default)]
pub struct JsonBodyStage;

impl JsonBodyStage {
    fn is_json_content_type(context: &StageContext) -> bool {
        context
            .header(CONTENT_TYPE.as_str())
            .and_then(|ct| ct.split(';').next())
            .map(|mime| {
                let mime = mime.trim().to_ascii_lowercase();
                mime == "application/json" || mime.ends_with("+json")
            })
            .unwrap_or(false)
    }
}

#[async_trait]
impl Stage for JsonBodyStage {
    fn name(&self) -> &str {
        "json_body"
    }

    async fn process(&self, context: &mut StageContext) -> CatalogResult<()> {
        if context.raw_body.is_empty() || !Self::is_json_content_type(context) {
            context.json = Some(Value::Object(Map::new()));
            return Ok(());
        }

        let json = serde_json::from_slice(&context.raw_body)
            .map_err(|_| CatalogError::validation("Invalid JSON format"))?;
        context.json = Some(json);
        Ok(())
    }
}

/// Rejects requests without the configured API key
#[derive(Debug)]
pub struct ApiKeyStage {
    authenticator: ApiKeyAuthenticator,
}

impl ApiKeyStage {
    pub fn new(authenticator: ApiKeyAuthenticator) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl Stage for ApiKeyStage {
    fn name(&self) -> &str {
        "api_key"
    }

    async fn process(&self, context: &mut StageContext) -> CatalogResult<()> {
        let provided = context.header(self.authenticator.header_name());
        self.authenticator.authenticate(provided)
    }
}

/// Checks the decoded body against the product field rules
#[derive(Debug)]
pub struct ProductValidationStage {
    mode: ValidationMode,
}

impl ProductValidationStage {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }
}

#[async_trait]
impl Stage for ProductValidationStage {
    fn name(&self) -> &str {
        match self.mode {
            ValidationMode::Full => "product_validation",
            ValidationMode::Partial => "product_validation_partial",
        }
    }

    async fn process(&self, context: &mut StageContext) -> CatalogResult<()> {
        let empty = Value::Object(Map::new());
        let body = context.json.as_ref().unwrap_or(&empty);

        let errors = validate_product(body, self.mode);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::validation(format!(
                "Validation errors: {}",
                errors.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method, Uri};
    use serde_json::json;

    fn context(content_type: Option<&str>, body: &'static str) -> StageContext {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, ct.parse().unwrap());
        }
        StageContext::new(
            Method::POST,
            Uri::from_static("/api/products"),
            headers,
            Bytes::from_static(body.as_bytes()),
        )
    }

    #[tokio::test]
    async fn test_json_body_decodes() {
        let mut ctx = context(Some("application/json; charset=utf-8"), r#"{"name":"Pen"}"#);
        JsonBodyStage.process(&mut ctx).await.unwrap();
        assert_eq!(ctx.json, Some(json!({ "name": "Pen" })));
    }

    #[tokio::test]
    async fn test_json_body_rejects_malformed() {
        let mut ctx = context(Some("application/json"), "{\"name\": ");
        let err = JsonBodyStage.process(&mut ctx).await.unwrap_err();
        assert_eq!(err, CatalogError::validation("Invalid JSON format"));
    }

    #[tokio::test]
    async fn test_json_body_empty_or_other_content_type() {
        let mut ctx = context(Some("application/json"), "");
        JsonBodyStage.process(&mut ctx).await.unwrap();
        assert_eq!(ctx.json, Some(json!({})));

        let mut ctx = context(Some("text/plain"), "{not json");
        JsonBodyStage.process(&mut ctx).await.unwrap();
        assert_eq!(ctx.json, Some(json!({})));

        let mut ctx = context(None, r#"{"name":"Pen"}"#);
        JsonBodyStage.process(&mut ctx).await.unwrap();
        assert_eq!(ctx.json, Some(json!({})));
    }

    #[tokio::test]
    async fn test_api_key_stage() {
        let stage = ApiKeyStage::new(ApiKeyAuthenticator::new("x-api-key", "secret"));

        let mut ctx = context(None, "");
        assert_eq!(
            stage.process(&mut ctx).await.unwrap_err(),
            CatalogError::auth("API key is required")
        );

        ctx.headers.insert("x-api-key", "nope".parse().unwrap());
        assert_eq!(
            stage.process(&mut ctx).await.unwrap_err(),
            CatalogError::auth("Invalid API key")
        );

        ctx.headers.insert("x-api-key", "secret".parse().unwrap());
        assert!(stage.process(&mut ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_validation_stage_joins_messages() {
        let stage = ProductValidationStage::new(ValidationMode::Full);
        let mut ctx = context(None, "");
        ctx.json = Some(json!({
            "name": "Pen",
            "description": "Blue ink pen",
            "category": "Office",
            "price": -1,
            "inStock": "yes"
        }));

        let err = stage.process(&mut ctx).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation errors: Price is required and must be a non-negative number, InStock must be a boolean value"
        );
    }

    #[tokio::test]
    async fn test_partial_validation_stage_accepts_subset() {
        let stage = ProductValidationStage::new(ValidationMode::Partial);
        let mut ctx = context(None, "");
        ctx.json = Some(json!({ "price": 5 }));
        assert!(stage.process(&mut ctx).await.is_ok());

        // no decoded body at all behaves like an empty object
        ctx.json = None;
        assert!(stage.process(&mut ctx).await.is_ok());
    }
}
