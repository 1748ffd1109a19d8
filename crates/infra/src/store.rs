//! Storage boundary and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use thiserror::Error;

use stockdesk_core::{ProductId, SupplierId};
use stockdesk_inventory::{Product, StockMovement};
use stockdesk_suppliers::Supplier;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("product not found")]
    ProductNotFound,

    #[error("supplier not found")]
    SupplierNotFound,

    /// The conditional quantity update would drive stock below zero.
    /// Carries the quantity that was available at decision time.
    #[error("update would drive stock negative (available: {available})")]
    WouldGoNegative { available: i64 },

    /// The adjustment would overflow the quantity counter.
    #[error("quantity exceeds the storable range")]
    QuantityOverflow,

    /// Transient infrastructure failure; the whole operation is safe to retry.
    #[error("storage error")]
    Unavailable,
}

/// Stock reads/writes: the repository boundary the movement service uses.
pub trait StockStore: Send + Sync {
    /// Current quantity for a product. `ProductNotFound` if the row is absent.
    fn get_current_stock(&self, product_id: &ProductId) -> Result<i64, StoreError>;

    /// Atomically adjust product quantity by `delta` and return the new value.
    ///
    /// The non-negative check happens inside the same store write as the
    /// adjustment: a decrement that would go below zero fails with
    /// `WouldGoNegative` and changes nothing. This, not the caller's
    /// pre-check, is the safeguard against concurrent lost updates.
    fn update_product_quantity(&self, product_id: &ProductId, delta: i64) -> Result<i64, StoreError>;

    /// Append one movement to the ledger.
    fn record_movement(&self, movement: StockMovement) -> Result<StockMovement, StoreError>;

    /// Ledger entries (optionally one product's), newest first.
    fn list_movements(&self, product_id: Option<&ProductId>) -> Result<Vec<StockMovement>, StoreError>;
}

/// Product catalog CRUD (out of the movement core, used by the API).
pub trait CatalogStore: Send + Sync {
    fn insert_product(&self, product: Product) -> Result<(), StoreError>;
    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>, StoreError>;
    fn list_products(&self) -> Result<Vec<Product>, StoreError>;
    /// Replace an existing product row.
    fn update_product(&self, product: Product) -> Result<(), StoreError>;
    fn delete_product(&self, product_id: &ProductId) -> Result<(), StoreError>;
}

/// Supplier directory CRUD.
pub trait SupplierStore: Send + Sync {
    fn insert_supplier(&self, supplier: Supplier) -> Result<(), StoreError>;
    fn get_supplier(&self, supplier_id: &SupplierId) -> Result<Option<Supplier>, StoreError>;
    fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError>;
    fn update_supplier(&self, supplier: Supplier) -> Result<(), StoreError>;
    fn delete_supplier(&self, supplier_id: &SupplierId) -> Result<(), StoreError>;
}

impl<S: StockStore + ?Sized> StockStore for Arc<S> {
    fn get_current_stock(&self, product_id: &ProductId) -> Result<i64, StoreError> {
        (**self).get_current_stock(product_id)
    }

    fn update_product_quantity(&self, product_id: &ProductId, delta: i64) -> Result<i64, StoreError> {
        (**self).update_product_quantity(product_id, delta)
    }

    fn record_movement(&self, movement: StockMovement) -> Result<StockMovement, StoreError> {
        (**self).record_movement(movement)
    }

    fn list_movements(&self, product_id: Option<&ProductId>) -> Result<Vec<StockMovement>, StoreError> {
        (**self).list_movements(product_id)
    }
}

/// In-memory store: products, movement ledger, suppliers.
///
/// Quantity updates take the products write lock for the whole
/// check-and-apply, which is what makes `update_product_quantity` atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    products: RwLock<HashMap<ProductId, Product>>,
    movements: RwLock<Vec<StockMovement>>,
    suppliers: RwLock<HashMap<SupplierId, Supplier>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StockStore for InMemoryStore {
    fn get_current_stock(&self, product_id: &ProductId) -> Result<i64, StoreError> {
        let products = self.products.read().map_err(|_| StoreError::Unavailable)?;
        products
            .get(product_id)
            .map(|p| p.quantity)
            .ok_or(StoreError::ProductNotFound)
    }

    fn update_product_quantity(&self, product_id: &ProductId, delta: i64) -> Result<i64, StoreError> {
        let mut products = self.products.write().map_err(|_| StoreError::Unavailable)?;
        let product = products
            .get_mut(product_id)
            .ok_or(StoreError::ProductNotFound)?;

        let new_quantity = product
            .quantity
            .checked_add(delta)
            .ok_or(StoreError::QuantityOverflow)?;
        if new_quantity < 0 {
            return Err(StoreError::WouldGoNegative {
                available: product.quantity,
            });
        }

        product.quantity = new_quantity;
        product.updated_at = Utc::now();
        Ok(new_quantity)
    }

    fn record_movement(&self, movement: StockMovement) -> Result<StockMovement, StoreError> {
        let mut movements = self.movements.write().map_err(|_| StoreError::Unavailable)?;
        movements.push(movement.clone());
        Ok(movement)
    }

    fn list_movements(&self, product_id: Option<&ProductId>) -> Result<Vec<StockMovement>, StoreError> {
        let movements = self.movements.read().map_err(|_| StoreError::Unavailable)?;
        let mut out: Vec<StockMovement> = movements
            .iter()
            .filter(|m| product_id.is_none_or(|id| m.product_id == *id))
            .cloned()
            .collect();
        out.reverse();
        Ok(out)
    }
}

impl CatalogStore for InMemoryStore {
    fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| StoreError::Unavailable)?;
        products.insert(product.id, product);
        Ok(())
    }

    fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(|_| StoreError::Unavailable)?;
        Ok(products.get(product_id).cloned())
    }

    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| StoreError::Unavailable)?;
        let mut out: Vec<Product> = products.values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn update_product(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| StoreError::Unavailable)?;
        if !products.contains_key(&product.id) {
            return Err(StoreError::ProductNotFound);
        }
        products.insert(product.id, product);
        Ok(())
    }

    fn delete_product(&self, product_id: &ProductId) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| StoreError::Unavailable)?;
        products
            .remove(product_id)
            .map(|_| ())
            .ok_or(StoreError::ProductNotFound)
    }
}

impl SupplierStore for InMemoryStore {
    fn insert_supplier(&self, supplier: Supplier) -> Result<(), StoreError> {
        let mut suppliers = self.suppliers.write().map_err(|_| StoreError::Unavailable)?;
        suppliers.insert(supplier.id, supplier);
        Ok(())
    }

    fn get_supplier(&self, supplier_id: &SupplierId) -> Result<Option<Supplier>, StoreError> {
        let suppliers = self.suppliers.read().map_err(|_| StoreError::Unavailable)?;
        Ok(suppliers.get(supplier_id).cloned())
    }

    fn list_suppliers(&self) -> Result<Vec<Supplier>, StoreError> {
        let suppliers = self.suppliers.read().map_err(|_| StoreError::Unavailable)?;
        let mut out: Vec<Supplier> = suppliers.values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn update_supplier(&self, supplier: Supplier) -> Result<(), StoreError> {
        let mut suppliers = self.suppliers.write().map_err(|_| StoreError::Unavailable)?;
        if !suppliers.contains_key(&supplier.id) {
            return Err(StoreError::SupplierNotFound);
        }
        suppliers.insert(supplier.id, supplier);
        Ok(())
    }

    fn delete_supplier(&self, supplier_id: &SupplierId) -> Result<(), StoreError> {
        let mut suppliers = self.suppliers.write().map_err(|_| StoreError::Unavailable)?;
        suppliers
            .remove(supplier_id)
            .map(|_| ())
            .ok_or(StoreError::SupplierNotFound)
    }
}

#[cfg(test)]
mod tests {
    use stockdesk_inventory::MovementKind;

    use super::*;

    fn seeded(quantity: i64) -> (InMemoryStore, ProductId) {
        let store = InMemoryStore::new();
        let mut product = Product::new(ProductId::new(), "Widget", 500).unwrap();
        product.quantity = quantity;
        let id = product.id;
        store.insert_product(product).unwrap();
        (store, id)
    }

    #[test]
    fn missing_product_reports_not_found() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.get_current_stock(&ProductId::new()),
            Err(StoreError::ProductNotFound)
        );
    }

    #[test]
    fn quantity_update_applies_delta() {
        let (store, id) = seeded(50);
        assert_eq!(store.update_product_quantity(&id, -10), Ok(40));
        assert_eq!(store.get_current_stock(&id), Ok(40));
    }

    #[test]
    fn conditional_update_refuses_to_go_negative() {
        let (store, id) = seeded(5);
        assert_eq!(
            store.update_product_quantity(&id, -10),
            Err(StoreError::WouldGoNegative { available: 5 })
        );
        // Failed update changes nothing.
        assert_eq!(store.get_current_stock(&id), Ok(5));
    }

    #[test]
    fn overflowing_adjust_is_rejected() {
        let (store, id) = seeded(i64::MAX);
        assert_eq!(
            store.update_product_quantity(&id, i64::MAX),
            Err(StoreError::QuantityOverflow)
        );
        // Failed update changes nothing, and the lock stays healthy.
        assert_eq!(store.get_current_stock(&id), Ok(i64::MAX));
        assert_eq!(store.update_product_quantity(&id, -1), Ok(i64::MAX - 1));
    }

    #[test]
    fn ledger_lists_newest_first() {
        let (store, id) = seeded(10);
        let first = StockMovement::new(id, 3, MovementKind::In);
        let second = StockMovement::new(id, 1, MovementKind::Out);
        store.record_movement(first.clone()).unwrap();
        store.record_movement(second.clone()).unwrap();

        let listed = store.list_movements(Some(&id)).unwrap();
        assert_eq!(listed, vec![second, first]);
    }

    #[test]
    fn ledger_filter_is_per_product() {
        let (store, id) = seeded(10);
        let other = ProductId::new();
        store
            .record_movement(StockMovement::new(other, 2, MovementKind::In))
            .unwrap();

        assert!(store.list_movements(Some(&id)).unwrap().is_empty());
        assert_eq!(store.list_movements(None).unwrap().len(), 1);
    }
}
