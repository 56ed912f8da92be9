//! # Product Catalog API - Main Entry Point
//!
//! Loads configuration, installs logging and serves the catalog until SIGINT or
//! SIGTERM.

use tokio::signal;
use tracing::{error, info};

use product_catalog_api::core::config::DEFAULT_CONFIG_PATH;
use product_catalog_api::observability::init_logging;
use product_catalog_api::{CatalogConfig, CatalogResult, CatalogServer};

#[tokio::main]
async fn main() -> CatalogResult<()> {
    let config_path =
        std::env::var("CATALOG_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = CatalogConfig::load_or_default(&config_path).await?;

    init_logging(&config.observability.logging)?;

    info!("Starting product catalog API");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        environment = ?config.environment,
        seed_data = config.catalog.seed_data,
        "Configuration loaded"
    );

    let server = CatalogServer::new(&config)?;
    log_endpoints(&config);

    if let Err(e) = server.serve_with_shutdown(shutdown_signal()).await {
        error!("Server error: {}", e);
        return Err(e);
    }

    info!("Product catalog API shutdown complete");
    Ok(())
}

fn log_endpoints(config: &CatalogConfig) {
    let endpoints = [
        "GET    /health                  - Health check",
        "GET    /api/products            - List products (filtering and pagination)",
        "GET    /api/products/:id        - Get a product",
        "POST   /api/products            - Create a product (requires API key)",
        "PUT    /api/products/:id        - Update a product (requires API key)",
        "DELETE /api/products/:id        - Delete a product (requires API key)",
        "GET    /api/products/search     - Search products",
        "GET    /api/products/stats      - Product statistics",
    ];
    for endpoint in endpoints {
        info!("{}", endpoint);
    }
    info!("Mutating routes expect the '{}' header", config.auth.header);
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
