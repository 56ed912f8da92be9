//! # API Key Authentication
//!
//! A single static shared secret guards the mutating product routes. The header
//! value is compared in constant time.

use subtle::ConstantTimeEq;

use crate::core::config::AuthConfig;
use crate::core::error::{CatalogError, CatalogResult};

/// Checks the API key header against the configured secret
#[derive(Clone)]
pub struct ApiKeyAuthenticator {
    header: String,
    secret: String,
}

impl std::fmt::Debug for ApiKeyAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuthenticator")
            .field("header", &self.header)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl ApiKeyAuthenticator {
    pub fn new<H: Into<String>, S: Into<String>>(header: H, secret: S) -> Self {
        Self {
            header: header.into().to_ascii_lowercase(),
            secret: secret.into(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.header.clone(), config.api_key.clone())
    }

    /// Name of the header the key is read from
    pub fn header_name(&self) -> &str {
        &self.header
    }

    /// Accept the request only when `provided` equals the configured secret
    pub fn authenticate(&self, provided: Option<&str>) -> CatalogResult<()> {
        let provided = match provided {
            Some(value) if !value.is_empty() => value,
            _ => return Err(CatalogError::auth("API key is required")),
        };

        if bool::from(provided.as_bytes().ct_eq(self.secret.as_bytes())) {
            Ok(())
        } else {
            Err(CatalogError::auth("Invalid API key"))
        }
    }
}
