use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockdesk_core::{DomainError, MovementId, ProductId, SupplierId, UserId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    /// Goods in: increases product quantity.
    In,
    /// Goods out: decreases product quantity.
    Out,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "in",
            MovementKind::Out => "out",
        }
    }

    /// Signed quantity delta this movement applies to current stock.
    pub fn signed_delta(&self, quantity: i64) -> i64 {
        match self {
            MovementKind::In => quantity,
            MovementKind::Out => -quantity,
        }
    }
}

impl core::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementKind::In),
            "out" => Ok(MovementKind::Out),
            other => Err(DomainError::validation(format!(
                "movement kind must be 'in' or 'out', got '{other}'"
            ))),
        }
    }
}

/// One recorded stock change: an append-only ledger entry.
///
/// Movements are immutable once created; they are never updated or deleted
/// in normal operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    /// Always positive; direction is carried by `kind`.
    pub quantity: i64,
    /// Serialized as `type`, the wire name clients use.
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub occurred_at: DateTime<Utc>,
    pub supplier_id: Option<SupplierId>,
    pub notes: Option<String>,
    pub recorded_by: Option<UserId>,
}

impl StockMovement {
    pub fn new(product_id: ProductId, quantity: i64, kind: MovementKind) -> Self {
        Self {
            id: MovementId::new(),
            product_id,
            quantity,
            kind,
            occurred_at: Utc::now(),
            supplier_id: None,
            notes: None,
            recorded_by: None,
        }
    }

    /// Signed delta this movement applies to product quantity.
    pub fn signed_delta(&self) -> i64 {
        self.kind.signed_delta(self.quantity)
    }
}
