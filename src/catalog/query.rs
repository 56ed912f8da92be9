//! # Filtering, Pagination and Statistics
//!
//! Linear passes over a store snapshot. Filters are conjunctive and applied in a
//! fixed order (category, stock, name search); pagination slices the filtered
//! result; statistics always cover the whole store.

use std::collections::BTreeMap;

use crate::core::types::{CatalogStats, PaginationMeta, PriceRange, Product};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Filters for the list route
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive exact category match
    pub category: Option<String>,
    /// Stock status to keep
    pub in_stock: Option<bool>,
    /// Case-insensitive substring of the name
    pub name_contains: Option<String>,
}

impl ProductFilter {
    /// Build from raw query values
    ///
    /// Empty `category` and `search` values count as absent. Any `inStock`
    /// value that is present, even an empty one, filters: `"true"` keeps in-stock
    /// products and everything else keeps out-of-stock products.
    pub fn from_params(
        category: Option<&str>,
        in_stock: Option<&str>,
        search: Option<&str>,
    ) -> Self {
        fn present(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.is_empty())
        }

        Self {
            category: present(category).map(str::to_lowercase),
            in_stock: in_stock.map(|s| s == "true"),
            name_contains: present(search).map(str::to_lowercase),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_ref()
            .map_or(true, |c| product.category.to_lowercase() == *c)
            && self.in_stock.map_or(true, |s| product.in_stock == s)
            && self
                .name_contains
                .as_ref()
                .map_or(true, |needle| product.name.to_lowercase().contains(needle.as_str()))
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Case-insensitive match of an already lowercased term against name or description
pub fn matches_text(product: &Product, term: &str) -> bool {
    product.name.to_lowercase().contains(term) || product.description.to_lowercase().contains(term)
}

/// Normalized page and limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Parse raw query values. Missing or non-integer values take the defaults;
    /// `page` is clamped to at least 1 and `limit` to `[1, 100]`.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |v: Option<&str>| v.and_then(|s| s.trim().parse::<i64>().ok());

        let page = parse(page).map_or(DEFAULT_PAGE, |p| p.max(1) as usize);
        let limit = parse(limit).map_or(DEFAULT_LIMIT, |l| l.clamp(1, MAX_LIMIT as i64) as usize);

        Self { page, limit }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// One page of results plus its metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Product>,
    pub meta: PaginationMeta,
}

/// Slice `[offset, offset + limit)` out of `items`; pages past the end are empty
pub fn paginate(items: &[&Product], request: PageRequest) -> Page {
    let total = items.len();
    let items = items
        .iter()
        .skip(request.offset())
        .take(request.limit)
        .map(|p| (*p).clone())
        .collect();

    Page {
        items,
        meta: PaginationMeta {
            current: request.page,
            pages: total.div_ceil(request.limit),
            total,
            limit: request.limit,
        },
    }
}

/// Aggregate statistics over every product
pub fn summarize(products: &[Product]) -> CatalogStats {
    let total = products.len();
    let in_stock = products.iter().filter(|p| p.in_stock).count();

    let mut by_category = BTreeMap::new();
    for product in products {
        *by_category.entry(product.category.clone()).or_insert(0) += 1;
    }

    let (average_price, price_range) = if products.is_empty() {
        (0.0, PriceRange { min: 0.0, max: 0.0 })
    } else {
        let sum: f64 = products.iter().map(|p| p.price).sum();
        let min = products.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let max = products.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
        (round_cents(sum / total as f64), PriceRange { min, max })
    };

    CatalogStats {
        total,
        in_stock,
        out_of_stock: total - in_stock,
        by_category,
        average_price,
        price_range,
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
