//! # Configuration Module
//!
//! Loads the catalog service configuration from a YAML file, applies environment
//! variable overrides and validates the result before the server starts.
//!
//! ## Key Features
//! - YAML configuration parsing with serde, every field defaulted
//! - Environment variable overrides (`CATALOG_<SECTION>_<FIELD>`)
//! - Validation that reports every problem at once

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::core::error::{CatalogError, CatalogResult};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/catalog.yaml";

/// Default shared secret accepted in the API key header
pub const DEFAULT_API_KEY: &str = "your-secret-api-key-123";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Deployment environment; development mode exposes error details
    pub environment: Environment,

    /// Listener settings
    pub server: ServerConfig,

    /// API key settings for mutating routes
    pub auth: AuthConfig,

    /// Logging settings
    pub observability: ObservabilityConfig,

    /// Record store settings
    pub catalog: StoreConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: String,

    /// HTTP listen port
    pub http_port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// How long in-flight requests may run after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            http_port: 3000,
            max_body_size: 10 * 1024 * 1024, // 10MB
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// API key configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// The single accepted secret
    pub api_key: String,

    /// Header carrying the secret
    pub header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            header: "x-api-key".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Load the four sample products at startup
    pub seed_data: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed_data: true }
    }
}

impl CatalogConfig {
    /// Load configuration from a YAML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CatalogError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: CatalogConfig = serde_yaml::from_str(&content)?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path` if it exists, otherwise start from defaults.
    /// Environment overrides and validation apply in both cases.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        if tokio::fs::try_exists(path.as_ref()).await.unwrap_or(false) {
            return Self::load_from_file(path).await;
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> CatalogResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Variables follow the pattern `CATALOG_<SECTION>_<FIELD>`. `PORT` is
    /// accepted as a fallback for the listen port.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CatalogResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup("CATALOG_ENVIRONMENT") {
            self.environment = env
                .parse()
                .map_err(|e| CatalogError::config(format!("Invalid CATALOG_ENVIRONMENT: {}", e)))?;
        }

        if let Some(addr) = lookup("CATALOG_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }

        if let Some((name, port)) = lookup("CATALOG_HTTP_PORT")
            .map(|p| ("CATALOG_HTTP_PORT", p))
            .or_else(|| lookup("PORT").map(|p| ("PORT", p)))
        {
            self.server.http_port = port
                .parse()
                .map_err(|e| CatalogError::config(format!("Invalid {}: {}", name, e)))?;
        }

        if let Some(size) = lookup("CATALOG_MAX_BODY_SIZE") {
            self.server.max_body_size = size
                .parse()
                .map_err(|e| CatalogError::config(format!("Invalid CATALOG_MAX_BODY_SIZE: {}", e)))?;
        }

        if let Some(timeout) = lookup("CATALOG_SHUTDOWN_TIMEOUT") {
            self.server.shutdown_timeout = humantime::parse_duration(&timeout).map_err(|e| {
                CatalogError::config(format!("Invalid CATALOG_SHUTDOWN_TIMEOUT: {}", e))
            })?;
        }

        if let Some(key) = lookup("CATALOG_API_KEY") {
            self.auth.api_key = key;
        }

        if let Some(header) = lookup("CATALOG_API_KEY_HEADER") {
            self.auth.header = header;
        }

        if let Some(level) = lookup("CATALOG_LOG_LEVEL") {
            self.observability.logging.level = level;
        }

        if let Some(format) = lookup("CATALOG_LOG_FORMAT") {
            self.observability.logging.format = format
                .parse()
                .map_err(|e| CatalogError::config(format!("Invalid CATALOG_LOG_FORMAT: {}", e)))?;
        }

        if let Some(seed) = lookup("CATALOG_SEED_DATA") {
            self.catalog.seed_data = seed
                .parse()
                .map_err(|e| CatalogError::config(format!("Invalid CATALOG_SEED_DATA: {}", e)))?;
        }

        Ok(())
    }

    /// Validate the configuration, reporting every problem found
    pub fn validate(&self) -> CatalogResult<()> {
        let mut errors = Vec::new();

        if self.server.bind_address.trim().is_empty() {
            errors.push("bind_address cannot be empty".to_string());
        }

        if self.server.http_port == 0 {
            errors.push("http_port must be greater than 0".to_string());
        }

        if self.server.max_body_size == 0 {
            errors.push("max_body_size must be greater than 0".to_string());
        }

        if self.auth.api_key.is_empty() {
            errors.push("api_key cannot be empty".to_string());
        }

        if self.auth.header.is_empty() {
            errors.push("auth header name cannot be empty".to_string());
        } else if axum::http::HeaderName::from_bytes(self.auth.header.as_bytes()).is_err() {
            errors.push(format!("'{}' is not a valid header name", self.auth.header));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::config(errors.join("; ")))
        }
    }

    /// Resolve the listen address
    pub fn socket_addr(&self) -> CatalogResult<SocketAddr> {
        format!("{}:{}", self.server.bind_address, self.server.http_port)
            .parse()
            .map_err(|e| CatalogError::config(format!("Invalid bind address: {}", e)))
    }
}
