//! # HTTP API
//!
//! Route table for the product catalog. Read routes are open; create, update and
//! delete run behind a per-route stage pipeline (API key check, then field
//! validation) before their handler. Bodies arrive already decoded by the
//! server-wide decoding layer.

pub mod health;
pub mod products;

use axum::{
    http::Uri,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::auth::ApiKeyAuthenticator;
use crate::catalog::{ProductStore, ValidationMode};
use crate::core::config::CatalogConfig;
use crate::core::error::CatalogError;
use crate::middleware::{run_pipeline, ApiKeyStage, ProductValidationStage, StagePipeline};

/// State shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<ProductStore>,
}

impl AppState {
    pub fn new(store: ProductStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Stage pipelines for the mutating routes
#[derive(Debug, Clone)]
pub struct RoutePipelines {
    pub create: Arc<StagePipeline>,
    pub update: Arc<StagePipeline>,
    pub delete: Arc<StagePipeline>,
}

impl RoutePipelines {
    pub fn from_config(config: &CatalogConfig) -> Self {
        let authenticator = ApiKeyAuthenticator::from_config(&config.auth);
        let base = || {
            StagePipeline::new(config.server.max_body_size)
                .with_stage(ApiKeyStage::new(authenticator.clone()))
        };

        Self {
            create: Arc::new(base().with_stage(ProductValidationStage::new(ValidationMode::Full))),
            update: Arc::new(
                base().with_stage(ProductValidationStage::new(ValidationMode::Partial)),
            ),
            delete: Arc::new(base()),
        }
    }
}

pub struct ApiRouter;

impl ApiRouter {
    /// Create the router with every product route, health and the not-found fallback
    pub fn create_router(state: AppState, config: &CatalogConfig) -> Router {
        let pipelines = RoutePipelines::from_config(config);

        Router::new()
            .route("/health", get(health::health_check).fallback(route_not_found))
            .route(
                "/api/products",
                get(products::list_products)
                    .merge(
                        post(products::create_product)
                            .route_layer(from_fn_with_state(pipelines.create, run_pipeline)),
                    )
                    .fallback(route_not_found),
            )
            .route(
                "/api/products/search",
                get(products::search_products).fallback(route_not_found),
            )
            .route(
                "/api/products/stats",
                get(products::product_stats).fallback(route_not_found),
            )
            .route(
                "/api/products/:id",
                get(products::get_product)
                    .merge(
                        put(products::update_product)
                            .route_layer(from_fn_with_state(pipelines.update, run_pipeline)),
                    )
                    .merge(
                        delete(products::delete_product)
                            .route_layer(from_fn_with_state(pipelines.delete, run_pipeline)),
                    )
                    .fallback(route_not_found),
            )
            .fallback(route_not_found)
            .with_state(state)
    }
}

/// Fallback for unmatched paths and unsupported methods
pub async fn route_not_found(uri: Uri) -> CatalogError {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    CatalogError::not_found(format!("Route {} not found", target))
}
