//! # HTTP Server
//!
//! Assembles the request pipeline around the API router and runs it on a tokio
//! listener with graceful shutdown.
//!
//! Layer order, outermost first: tracing span, request logging, error
//! formatting, panic capture, body decoding, trailing-slash trimming, then the
//! routes (each mutating route with its own stage pipeline) and the not-found
//! fallback.

use axum::{middleware, Router};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer, normalize_path::NormalizePathLayer, trace::TraceLayer,
};
use tracing::{info, warn};

use crate::api::{ApiRouter, AppState};
use crate::catalog::ProductStore;
use crate::core::config::CatalogConfig;
use crate::core::error::{CatalogError, CatalogResult};
use crate::middleware::{
    format_errors, log_requests, panic_response, run_pipeline, ErrorFormatting, JsonBodyStage,
    StagePipeline,
};

/// Build the full application with a store prepared from the configuration
pub fn build_app(config: &CatalogConfig) -> Router {
    let store = if config.catalog.seed_data {
        ProductStore::with_seed_data()
    } else {
        ProductStore::new()
    };
    build_app_with_store(config, store)
}

/// Build the full application around an existing store
pub fn build_app_with_store(config: &CatalogConfig, store: ProductStore) -> Router {
    with_request_pipeline(ApiRouter::create_router(AppState::new(store), config), config)
}

/// Wrap a route table in the server-wide request pipeline
///
/// Trailing slashes are trimmed before dispatch, and every body is decoded
/// (and size checked) before routing, so malformed JSON is a 400 on any route.
pub fn with_request_pipeline(routes: Router, config: &CatalogConfig) -> Router {
    let formatting = ErrorFormatting {
        include_stack: config.environment.is_development(),
    };
    let body_decoding =
        Arc::new(StagePipeline::new(config.server.max_body_size).with_stage(JsonBodyStage));

    Router::new()
        .fallback_service(NormalizePathLayer::trim_trailing_slash().layer(routes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(log_requests))
                .layer(middleware::from_fn_with_state(formatting, format_errors))
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(middleware::from_fn_with_state(body_decoding, run_pipeline)),
        )
}

/// The catalog HTTP server
pub struct CatalogServer {
    app: Router,
    bind_addr: SocketAddr,
    shutdown_timeout: Duration,
}

impl CatalogServer {
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        Ok(Self {
            app: build_app(config),
            bind_addr: config.socket_addr()?,
            shutdown_timeout: config.server.shutdown_timeout,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Serve until `signal` resolves, then give in-flight requests up to the
    /// configured shutdown timeout to finish
    pub async fn serve_with_shutdown<F>(self, signal: F) -> CatalogResult<()>
    where
        F: Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .map_err(|e| CatalogError::config(format!("Failed to bind {}: {}", self.bind_addr, e)))?;
        info!("Product catalog listening on {}", self.bind_addr);

        let stop = Arc::new(Notify::new());
        let server = axum::serve(listener, self.app).with_graceful_shutdown({
            let stop = stop.clone();
            async move { stop.notified().await }
        });
        let mut server_task = tokio::spawn(server.into_future());

        tokio::select! {
            joined = &mut server_task => return flatten(joined),
            _ = signal => {
                info!("Shutdown signal received, draining in-flight requests");
                stop.notify_one();
            }
        }

        match tokio::time::timeout(self.shutdown_timeout, server_task).await {
            Ok(joined) => flatten(joined),
            Err(_) => {
                warn!(
                    "Server shutdown timed out after {:?}, dropping remaining connections",
                    self.shutdown_timeout
                );
                Ok(())
            }
        }
    }
}

fn flatten(joined: Result<std::io::Result<()>, tokio::task::JoinError>) -> CatalogResult<()> {
    joined
        .map_err(|e| CatalogError::internal(format!("Server task failed: {}", e)))?
        .map_err(CatalogError::from)
}
