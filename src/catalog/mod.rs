//! # Catalog Domain
//!
//! The record store and the pure logic that runs over it: field validation,
//! filtering, pagination and statistics. Nothing here knows about HTTP.

pub mod query;
pub mod store;
pub mod validation;

pub use query::{paginate, summarize, Page, PageRequest, ProductFilter};
pub use store::ProductStore;
pub use validation::{validate_product, ValidationMode};
