//! # In-Memory Product Store
//!
//! Holds the ordered product list and the id counter behind a single lock.
//! Ids are assigned from the counter and never reused, deletions included.

use parking_lot::RwLock;
use tracing::debug;

use crate::core::types::{Product, ProductDraft, ProductPatch};

#[derive(Debug)]
struct StoreInner {
    products: Vec<Product>,
    next_id: u64,
}

/// Authoritative holder of product records for the lifetime of the process
///
/// The list and the counter live under one `RwLock`, so every mutation is atomic
/// with respect to readers and the counter can never drift from the list.
#[derive(Debug)]
pub struct ProductStore {
    inner: RwLock<StoreInner>,
}

impl Default for ProductStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductStore {
    /// Create an empty store whose first id is 1
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                products: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Create a store holding the four sample products; the next id is 5
    pub fn with_seed_data() -> Self {
        let store = Self::new();
        for draft in seed_products() {
            store.create(draft);
        }
        store
    }

    /// Snapshot of every product in insertion order
    pub fn list(&self) -> Vec<Product> {
        self.inner.read().products.clone()
    }

    /// Run `f` against the product list while holding the read lock
    pub fn snapshot_with<R>(&self, f: impl FnOnce(&[Product]) -> R) -> R {
        let inner = self.inner.read();
        f(&inner.products)
    }

    pub fn get(&self, id: u64) -> Option<Product> {
        self.inner
            .read()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Assign the next id, append, and return the stored copy
    pub fn create(&self, draft: ProductDraft) -> Product {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;

        let product = draft.into_product(id);
        inner.products.push(product.clone());
        debug!(product_id = id, "Product created");
        product
    }

    /// Overwrite the supplied fields of product `id`
    pub fn update(&self, id: u64, patch: &ProductPatch) -> Option<Product> {
        let mut inner = self.inner.write();
        let product = inner.products.iter_mut().find(|p| p.id == id)?;
        patch.apply_to(product);
        debug!(product_id = id, "Product updated");
        Some(product.clone())
    }

    /// Remove product `id` and return it
    pub fn delete(&self, id: u64) -> Option<Product> {
        let mut inner = self.inner.write();
        let index = inner.products.iter().position(|p| p.id == id)?;
        let removed = inner.products.remove(index);
        debug!(product_id = id, "Product deleted");
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.inner.read().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn seed_products() -> Vec<ProductDraft> {
    let draft = |name: &str, description: &str, price: f64, category: &str, in_stock: bool| {
        ProductDraft {
            name: name.to_string(),
            description: description.to_string(),
            price,
            category: category.to_string(),
            in_stock,
        }
    };

    vec![
        draft(
            "Laptop",
            "High-performance laptop for professionals",
            1299.99,
            "Electronics",
            true,
        ),
        draft(
            "Coffee Mug",
            "Ceramic coffee mug with ergonomic handle",
            12.99,
            "Home",
            true,
        ),
        draft(
            "Wireless Headphones",
            "Noise-cancelling wireless headphones",
            199.99,
            "Electronics",
            false,
        ),
        draft(
            "Book - JavaScript Guide",
            "Comprehensive guide to JavaScript programming",
            29.99,
            "Books",
            true,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn pen() -> ProductDraft {
        ProductDraft {
            name: "Pen".to_string(),
            description: "Blue ink pen".to_string(),
            price: 1.5,
            category: "Office".to_string(),
            in_stock: true,
        }
    }

    #[test]
    fn test_seed_data() {
        let store = ProductStore::with_seed_data();
        let products = store.list();

        assert_eq!(products.len(), 4);
        assert_eq!(
            products.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(products[0].name, "Laptop");
        assert!(!products[2].in_stock);
        assert_eq!(store.create(pen()).id, 5);
    }

    #[test]
    fn test_ids_are_never_reused() {
        let store = ProductStore::new();
        let first = store.create(pen());
        let second = store.create(pen());
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        store.delete(second.id).unwrap();
        let third = store.create(pen());
        assert_eq!(third.id, 3);
        assert!(third.id > second.id);
    }

    #[test]
    fn test_update_overwrites_only_supplied_fields() {
        let store = ProductStore::with_seed_data();
        let before = store.get(2).unwrap();

        let patch = ProductPatch {
            price: Some(15.0),
            ..Default::default()
        };
        let after = store.update(2, &patch).unwrap();

        assert_eq!(after.price, 15.0);
        assert_eq!(after.name, before.name);
        assert_eq!(after.description, before.description);
        assert_eq!(after.category, before.category);
        assert_eq!(after.in_stock, before.in_stock);
        assert_eq!(store.get(2).unwrap(), after);
    }

    #[test]
    fn test_update_and_delete_missing() {
        let store = ProductStore::with_seed_data();
        assert!(store.update(42, &ProductPatch::default()).is_none());
        assert!(store.delete(42).is_none());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let store = ProductStore::with_seed_data();
        let removed = store.delete(1).unwrap();

        assert_eq!(removed.name, "Laptop");
        assert_eq!(store.len(), 3);
        assert!(store.get(1).is_none());
        // insertion order of the rest is preserved
        assert_eq!(
            store.list().iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_concurrent_creates_assign_unique_ids() {
        let store = Arc::new(ProductStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..50).map(|_| store.create(pen()).id).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 400);
        assert_eq!(store.len(), 400);
        assert_eq!(*ids.last().unwrap(), 400);
    }
}
