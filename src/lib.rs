//! # Product Catalog API
//!
//! An HTTP CRUD service over an in-memory product catalog: filtering,
//! pagination, text search, aggregate statistics, a static API key guarding the
//! mutating routes, and one error envelope for every failure.
//!
//! ## Module Layout
//!
//! - `core`: configuration, the error taxonomy and the wire types
//! - `catalog`: the record store plus validation, filtering and statistics
//! - `auth`: API key check
//! - `middleware`: request logging, error formatting and per-route stage pipelines
//! - `api`: route handlers and the route table
//! - `observability`: logging setup
//! - `server`: application assembly and the listener

/// Configuration, error types and request/response schemas
pub mod core;

/// Product store and the pure logic that runs over it
pub mod catalog;

/// Static API key authentication
pub mod auth;

/// Request processing stages and cross-cutting layers
pub mod middleware;

/// Route handlers
pub mod api;

/// Structured logging
pub mod observability;

/// Application assembly and serving
pub mod server;

pub use crate::core::config::CatalogConfig;
pub use crate::core::error::{CatalogError, CatalogResult};
pub use crate::core::types::{Product, ProductDraft, ProductPatch};
pub use catalog::ProductStore;
pub use server::{build_app, build_app_with_store, CatalogServer};
