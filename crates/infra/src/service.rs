//! Movement service: validate → persist → notify.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use stockdesk_core::{ProductId, SupplierId, UserId};
use stockdesk_events::{ChangeEvent, ChangeHub, ChangeOp, Table};
use stockdesk_inventory::{
    validate_inputs, validate_movement, MovementKind, MovementRejection, StockMovement,
};

use crate::cache::StatsCache;
use crate::store::{StockStore, StoreError};

/// A proposed movement as submitted by the UI.
///
/// `product_id` is the raw form value: it may be empty or the "new"
/// placeholder, which the service rejects before any storage call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewMovement {
    pub product_id: String,
    pub quantity: i64,
    pub kind: MovementKind,
    pub notes: Option<String>,
    pub supplier_id: Option<SupplierId>,
    pub recorded_by: Option<UserId>,
}

/// Failure taxonomy carried alongside the human-readable message so callers
/// (the HTTP layer) can map to a status without parsing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionClass {
    /// Malformed request; not retried, surfaced to the user.
    InvalidInput,
    /// Business-rule rejection with exact available/requested numbers.
    InsufficientStock,
    /// Product row does not exist.
    NotFound,
    /// Transient infrastructure failure; the whole operation can be retried.
    Storage,
}

/// Result object handed back to callers. The service never panics and never
/// propagates errors past this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement: Option<StockMovement>,
    #[serde(skip)]
    pub rejection: Option<RejectionClass>,
}

impl MovementOutcome {
    fn recorded(movement: StockMovement) -> Self {
        Self {
            success: true,
            message: None,
            movement: Some(movement),
            rejection: None,
        }
    }

    fn rejected(class: RejectionClass, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            movement: None,
            rejection: Some(class),
        }
    }

    fn from_rejection(rejection: MovementRejection) -> Self {
        let class = if rejection.is_insufficient_stock() {
            RejectionClass::InsufficientStock
        } else {
            RejectionClass::InvalidInput
        };
        Self::rejected(class, rejection.to_string())
    }
}

/// Orchestrates a single movement against the stock store.
///
/// Policy: optimistic validation, atomic persistence. The validator runs
/// against the stock the request observed; the store's conditional update is
/// what actually closes the race between concurrent submissions.
pub struct MovementService<S> {
    store: Arc<S>,
    hub: Arc<ChangeHub>,
    stats: Arc<StatsCache>,
}

impl<S: StockStore> MovementService<S> {
    pub fn new(store: Arc<S>, hub: Arc<ChangeHub>, stats: Arc<StatsCache>) -> Self {
        Self { store, hub, stats }
    }

    /// Record one movement. Always resolves to an outcome object.
    pub fn record(&self, request: NewMovement) -> MovementOutcome {
        // Input-only checks first: a malformed request must not touch storage.
        if let Err(rejection) = validate_inputs(&request.product_id, request.quantity) {
            return MovementOutcome::from_rejection(rejection);
        }

        let product_id: ProductId = match request.product_id.parse() {
            Ok(id) => id,
            // Non-uuid ids cannot match any product row; same shape as an
            // absent product (stock 0) per the repository contract.
            Err(_) => return self.reject_against_stock(&request, 0),
        };

        // An absent row reads as stock 0 and falls out as a validation
        // failure downstream rather than an error.
        let current_stock = match self.store.get_current_stock(&product_id) {
            Ok(stock) => stock,
            Err(StoreError::ProductNotFound) => 0,
            Err(err) => {
                warn!(error = %err, "stock fetch failed");
                return MovementOutcome::rejected(RejectionClass::Storage, "storage error");
            }
        };

        if let Err(rejection) = validate_movement(
            &request.product_id,
            request.quantity,
            request.kind,
            current_stock,
        ) {
            return MovementOutcome::from_rejection(rejection);
        }

        self.persist(product_id, request)
    }

    /// Re-run the stock validation for an unresolvable product id so the
    /// caller sees the same message an empty shelf would produce.
    fn reject_against_stock(&self, request: &NewMovement, stock: i64) -> MovementOutcome {
        match validate_movement(&request.product_id, request.quantity, request.kind, stock) {
            Err(rejection) => MovementOutcome::from_rejection(rejection),
            // An `in` movement validates against any stock, but there is no
            // row to apply it to.
            Ok(()) => MovementOutcome::rejected(RejectionClass::NotFound, "product not found"),
        }
    }

    fn persist(&self, product_id: ProductId, request: NewMovement) -> MovementOutcome {
        let delta = request.kind.signed_delta(request.quantity);

        // Atomic conditional adjust: the store re-checks the non-negative
        // invariant under its write lock. A concurrent movement that drained
        // the stock between fetch and persist surfaces here.
        match self.store.update_product_quantity(&product_id, delta) {
            Ok(_new_quantity) => {}
            Err(StoreError::WouldGoNegative { available }) => {
                let rejection = if available == 0 {
                    MovementRejection::NoStockAvailable
                } else {
                    MovementRejection::InsufficientStock {
                        available,
                        requested: request.quantity,
                    }
                };
                return MovementOutcome::from_rejection(rejection);
            }
            Err(StoreError::ProductNotFound) => {
                return MovementOutcome::rejected(RejectionClass::NotFound, "product not found");
            }
            Err(err @ StoreError::QuantityOverflow) => {
                return MovementOutcome::rejected(RejectionClass::InvalidInput, err.to_string());
            }
            Err(err) => {
                warn!(error = %err, "quantity update failed");
                return MovementOutcome::rejected(RejectionClass::Storage, "storage error");
            }
        }

        let mut movement = StockMovement::new(product_id, request.quantity, request.kind);
        movement.notes = request.notes;
        movement.supplier_id = request.supplier_id;
        movement.recorded_by = request.recorded_by;

        let movement = match self.store.record_movement(movement) {
            Ok(movement) => movement,
            Err(err) => {
                // Ledger append failed after the quantity was adjusted.
                // Best-effort revert keeps projection and ledger consistent.
                warn!(error = %err, "ledger append failed, reverting quantity");
                if let Err(revert_err) = self.store.update_product_quantity(&product_id, -delta) {
                    warn!(error = %revert_err, "quantity revert failed");
                }
                return MovementOutcome::rejected(RejectionClass::Storage, "storage error");
            }
        };

        self.stats.clear();
        self.hub.publish(ChangeEvent::now(
            Table::Movements,
            ChangeOp::Insert,
            Some(product_id),
        ));
        self.hub.publish(ChangeEvent::now(
            Table::Products,
            ChangeOp::Update,
            Some(product_id),
        ));

        MovementOutcome::recorded(movement)
    }
}
