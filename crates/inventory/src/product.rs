use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::{CategoryId, DomainError, DomainResult, ProductId};

/// A catalog product.
///
/// `quantity` is the authoritative current stock count: the materialized
/// projection of the movement ledger. It is mutated only through validated
/// movements (via the store's atomic adjust) or direct catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Current stock. Invariant: never negative.
    pub quantity: i64,
    /// At or below this threshold the product counts as low stock.
    pub minimum_stock: i64,
    /// Unit price in the smallest currency unit (cents).
    pub price_cents: u64,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new product with zero stock.
    pub fn new(id: ProductId, name: impl Into<String>, price_cents: u64) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            name,
            quantity: 0,
            minimum_stock: 0,
            price_cents,
            category_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_minimum_stock(mut self, minimum_stock: i64) -> Self {
        self.minimum_stock = minimum_stock.max(0);
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Quantity at or below the configured threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.minimum_stock
    }

    /// Stock value of this line at current quantity.
    pub fn stock_value_cents(&self) -> u64 {
        self.price_cents.saturating_mul(self.quantity.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_starts_empty() {
        let p = Product::new(ProductId::new(), "Espresso beans 1kg", 1890).unwrap();
        assert_eq!(p.quantity, 0);
        assert!(p.is_low_stock());
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Product::new(ProductId::new(), "   ", 100).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn low_stock_uses_threshold_inclusive() {
        let mut p = Product::new(ProductId::new(), "Filter paper", 450)
            .unwrap()
            .with_minimum_stock(5);

        p.quantity = 6;
        assert!(!p.is_low_stock());
        p.quantity = 5;
        assert!(p.is_low_stock());
    }

    #[test]
    fn stock_value_never_overflows() {
        let mut p = Product::new(ProductId::new(), "Gold bar", u64::MAX).unwrap();
        p.quantity = i64::MAX;
        assert_eq!(p.stock_value_cents(), u64::MAX);
    }
}
