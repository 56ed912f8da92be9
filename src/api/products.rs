//! # Product Handlers
//!
//! One handler per product route. Mutating handlers run after their stage
//! pipeline, so by the time they execute the caller is authenticated and the
//! decoded body has passed validation.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::api::AppState;
use crate::catalog::query::{matches_text, paginate, summarize, PageRequest, ProductFilter};
use crate::core::error::{CatalogError, CatalogResult};
use crate::core::types::{
    ApiResponse, AppliedFilters, CatalogStats, ListParams, ListResponse, Product, ProductDraft,
    ProductPatch, SearchParams, SearchResponse,
};
use crate::middleware::JsonBody;

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> CatalogResult<Json<ListResponse>> {
    let Query(params) = query.map_err(query_rejected)?;

    let filter = ProductFilter::from_params(
        params.category.as_deref(),
        params.in_stock.as_deref(),
        params.search.as_deref(),
    );
    let request = PageRequest::from_params(params.page.as_deref(), params.limit.as_deref());

    let page = state
        .store
        .snapshot_with(|products| paginate(&filter.apply(products), request));

    Ok(Json(ListResponse {
        success: true,
        data: page.items,
        pagination: page.meta,
        filters: AppliedFilters {
            category: non_empty(params.category),
            in_stock: non_empty(params.in_stock),
            search: non_empty(params.search),
        },
    }))
}

/// `GET /api/products/search`
pub async fn search_products(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> CatalogResult<Json<SearchResponse>> {
    let Query(params) = query.map_err(query_rejected)?;

    let raw_query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| CatalogError::validation("Search query is required"))?;
    let term = raw_query.trim().to_lowercase();
    let request = PageRequest::from_params(params.page.as_deref(), params.limit.as_deref());

    let page = state.store.snapshot_with(|products| {
        let hits: Vec<&Product> = products.iter().filter(|p| matches_text(p, &term)).collect();
        paginate(&hits, request)
    });

    Ok(Json(SearchResponse {
        success: true,
        data: page.items,
        pagination: page.meta,
        query: raw_query,
    }))
}

/// `GET /api/products/stats`
pub async fn product_stats(State(state): State<AppState>) -> Json<ApiResponse<CatalogStats>> {
    Json(ApiResponse::ok(state.store.snapshot_with(summarize)))
}

/// `GET /api/products/:id`
pub async fn get_product(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> CatalogResult<Json<ApiResponse<Product>>> {
    let id = path_id(path)?;
    let product = stored_id(id)
        .and_then(|id| state.store.get(id))
        .ok_or_else(|| product_not_found(id))?;

    Ok(Json(ApiResponse::ok(product)))
}

/// `POST /api/products`
pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> CatalogResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let draft: ProductDraft = serde_json::from_value(body)
        .map_err(|e| CatalogError::validation(format!("Invalid product: {}", e)))?;

    let product = state.store.create(draft.normalized());
    info!(product_id = product.id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Product created successfully", product)),
    ))
}

/// `PUT /api/products/:id`
pub async fn update_product(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    JsonBody(body): JsonBody,
) -> CatalogResult<Json<ApiResponse<Product>>> {
    let id = path_id(path)?;
    let patch: ProductPatch = serde_json::from_value(body)
        .map_err(|e| CatalogError::validation(format!("Invalid product: {}", e)))?;

    let product = stored_id(id)
        .and_then(|id| state.store.update(id, &patch.normalized()))
        .ok_or_else(|| product_not_found(id))?;
    info!(product_id = product.id, "Product updated");

    Ok(Json(ApiResponse::with_message(
        "Product updated successfully",
        product,
    )))
}

/// `DELETE /api/products/:id`
pub async fn delete_product(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> CatalogResult<Json<ApiResponse<Product>>> {
    let id = path_id(path)?;
    let product = stored_id(id)
        .and_then(|id| state.store.delete(id))
        .ok_or_else(|| product_not_found(id))?;
    info!(product_id = product.id, "Product deleted");

    Ok(Json(ApiResponse::with_message(
        "Product deleted successfully",
        product,
    )))
}

fn path_id(path: Result<Path<String>, PathRejection>) -> CatalogResult<i64> {
    let Path(raw) = path.map_err(|_| invalid_product_id())?;
    parse_product_id(&raw)
}

/// Parse a path id. Any integer is accepted here; negative ids simply never match.
fn parse_product_id(raw: &str) -> CatalogResult<i64> {
    raw.trim().parse().map_err(|_| invalid_product_id())
}

fn invalid_product_id() -> CatalogError {
    CatalogError::validation("Product ID must be a valid number")
}

fn stored_id(id: i64) -> Option<u64> {
    u64::try_from(id).ok()
}

fn product_not_found(id: i64) -> CatalogError {
    CatalogError::not_found(format!("Product with ID {} not found", id))
}

fn query_rejected(rejection: QueryRejection) -> CatalogError {
    CatalogError::validation(rejection.body_text())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_id() {
        assert_eq!(parse_product_id("42").unwrap(), 42);
        assert_eq!(parse_product_id(" 7 ").unwrap(), 7);
        assert_eq!(parse_product_id("-1").unwrap(), -1);
        assert_eq!(
            parse_product_id("abc").unwrap_err(),
            CatalogError::validation("Product ID must be a valid number")
        );
        assert!(parse_product_id("1.5").is_err());
    }

    #[test]
    fn test_negative_ids_never_match() {
        assert_eq!(stored_id(-1), None);
        assert_eq!(stored_id(3), Some(3));
        assert_eq!(
            product_not_found(-1).to_string(),
            "Product with ID -1 not found"
        );
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("Books".to_string())), Some("Books".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
