//! Per-product observable stock state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::warn;

use stockdesk_core::ProductId;
use stockdesk_inventory::is_placeholder_product_id;

use crate::store::{StockStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ViewState {
    current_stock: i64,
    is_loading: bool,
    /// Generation of the fetch whose result is currently shown.
    applied_generation: u64,
}

/// Observable `{current_stock, is_loading}` state for one product.
///
/// - A placeholder product id ("", "new") never issues a storage read: the
///   view immediately reports stock 0, not loading.
/// - `refresh()` is idempotent and safe to call concurrently; a generation
///   ticket makes the latest resolved fetch win, so a stale out-of-order
///   response can never overwrite a newer value.
pub struct StockView {
    product_id: Option<ProductId>,
    store: Arc<dyn StockStore>,
    state: Mutex<ViewState>,
    next_generation: AtomicU64,
}

impl StockView {
    pub fn new(store: Arc<dyn StockStore>, raw_product_id: &str) -> Self {
        let product_id = if is_placeholder_product_id(raw_product_id) {
            None
        } else {
            raw_product_id.parse().ok()
        };

        Self {
            store,
            state: Mutex::new(ViewState {
                current_stock: 0,
                // Loading only when there is something to load.
                is_loading: product_id.is_some(),
                applied_generation: 0,
            }),
            product_id,
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    pub fn current_stock(&self) -> i64 {
        self.state.lock().map(|s| s.current_stock).unwrap_or(0)
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().map(|s| s.is_loading).unwrap_or(false)
    }

    /// Re-read current stock from the store.
    ///
    /// Placeholder views are a no-op. A missing product row reads as 0.
    /// Storage failures keep the last-known value (and stop the loading
    /// indicator) rather than surfacing an error to the view.
    pub fn refresh(&self) {
        let Some(product_id) = self.product_id else {
            return;
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;

        let fetched = match self.store.get_current_stock(&product_id) {
            Ok(stock) => Some(stock),
            Err(StoreError::ProductNotFound) => Some(0),
            Err(err) => {
                warn!(%product_id, error = %err, "stock refresh failed, keeping last-known value");
                None
            }
        };

        if let Ok(mut state) = self.state.lock() {
            // Last write wins: ignore results that resolved out of order.
            if generation < state.applied_generation {
                return;
            }
            state.applied_generation = generation;
            if let Some(stock) = fetched {
                state.current_stock = stock;
            }
            state.is_loading = false;
        }
    }
}

impl core::fmt::Debug for StockView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StockView")
            .field("product_id", &self.product_id)
            .field("current_stock", &self.current_stock())
            .field("is_loading", &self.is_loading())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use stockdesk_inventory::Product;

    use crate::store::{CatalogStore, InMemoryStore};

    use super::*;

    fn store_with_product(quantity: i64) -> (Arc<InMemoryStore>, ProductId) {
        let store = Arc::new(InMemoryStore::new());
        let mut product = Product::new(ProductId::new(), "Widget", 100).unwrap();
        product.quantity = quantity;
        let id = product.id;
        store.insert_product(product).unwrap();
        (store, id)
    }

    #[test]
    fn placeholder_id_reports_zero_without_reading() {
        let (store, _id) = store_with_product(42);

        for raw in ["", "   ", "new"] {
            let view = StockView::new(Arc::clone(&store) as Arc<dyn StockStore>, raw);
            assert_eq!(view.current_stock(), 0);
            assert!(!view.is_loading());
            view.refresh(); // still a no-op
            assert_eq!(view.current_stock(), 0);
        }
    }

    #[test]
    fn loads_on_first_refresh() {
        let (store, id) = store_with_product(42);
        let view = StockView::new(store as Arc<dyn StockStore>, &id.to_string());

        assert!(view.is_loading());
        view.refresh();
        assert!(!view.is_loading());
        assert_eq!(view.current_stock(), 42);
    }

    #[test]
    fn refresh_is_idempotent() {
        let (store, id) = store_with_product(7);
        let view = StockView::new(store as Arc<dyn StockStore>, &id.to_string());

        view.refresh();
        let first = view.current_stock();
        view.refresh();
        assert_eq!(view.current_stock(), first);
    }

    #[test]
    fn refresh_sees_new_writes() {
        let (store, id) = store_with_product(10);
        let view = StockView::new(
            Arc::clone(&store) as Arc<dyn StockStore>,
            &id.to_string(),
        );

        view.refresh();
        assert_eq!(view.current_stock(), 10);

        store.update_product_quantity(&id, -4).unwrap();
        view.refresh();
        assert_eq!(view.current_stock(), 6);
    }

    #[test]
    fn deleted_product_reads_as_zero() {
        let (store, id) = store_with_product(10);
        let view = StockView::new(
            Arc::clone(&store) as Arc<dyn StockStore>,
            &id.to_string(),
        );

        store.delete_product(&id).unwrap();
        view.refresh();
        assert_eq!(view.current_stock(), 0);
        assert!(!view.is_loading());
    }
}
