//! Change event and subscription filter types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::ProductId;

/// Logical table a change applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Products,
    Movements,
    Suppliers,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Movements => "movements",
            Table::Suppliers => "suppliers",
        }
    }
}

/// Kind of row change.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// A push notification that a row changed.
///
/// Events are facts: immutable, append-only, and safe to deliver more than
/// once (consumers refresh by re-reading current state, which is idempotent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub op: ChangeOp,
    /// Set when the change affects a specific product's stock.
    pub product_id: Option<ProductId>,
    pub occurred_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn now(table: Table, op: ChangeOp, product_id: Option<ProductId>) -> Self {
        Self {
            table,
            op,
            product_id,
            occurred_at: Utc::now(),
        }
    }
}

/// Subscription filter: which changes a consumer wants to see.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ChangeFilter {
    pub table: Option<Table>,
    pub product_id: Option<ProductId>,
}

impl ChangeFilter {
    /// Match every change.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match changes to one table.
    pub fn table(table: Table) -> Self {
        Self {
            table: Some(table),
            product_id: None,
        }
    }

    /// Match changes affecting one product (any table).
    pub fn product(product_id: ProductId) -> Self {
        Self {
            table: None,
            product_id: Some(product_id),
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if let Some(table) = self.table {
            if event.table != table {
                return false;
            }
        }
        if let Some(product_id) = self.product_id {
            if event.product_id != Some(product_id) {
                return false;
            }
        }
        true
    }
}
