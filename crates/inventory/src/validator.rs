//! Pure movement validation.
//!
//! No IO, no side effects, deterministic given its inputs. This isolation is
//! what makes the rules unit-testable independent of the store. The service
//! layer re-checks the non-negative invariant inside the store's atomic
//! update; this validator is the user-facing fast path.

use thiserror::Error;

use crate::movement::MovementKind;

/// Why a proposed movement is not admissible.
///
/// Display strings are part of the API contract: they are surfaced verbatim
/// to the operator so the exact reason (including available/requested
/// amounts) is always visible.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MovementRejection {
    #[error("product is required")]
    ProductRequired,

    #[error("quantity must be positive")]
    NonPositiveQuantity,

    #[error("no stock available")]
    NoStockAvailable,

    #[error("insufficient stock. Available: {available}, Requested: {requested}")]
    InsufficientStock { available: i64, requested: i64 },
}

impl MovementRejection {
    /// Business-rule rejection (as opposed to malformed input).
    pub fn is_insufficient_stock(&self) -> bool {
        matches!(
            self,
            MovementRejection::NoStockAvailable | MovementRejection::InsufficientStock { .. }
        )
    }
}

/// Placeholder ids used by unsaved forms ("new") and empty selections.
///
/// Views never issue a storage read for these.
pub fn is_placeholder_product_id(product_id: &str) -> bool {
    let trimmed = product_id.trim();
    trimmed.is_empty() || trimmed == "new"
}

/// Input-only checks (product id and quantity), independent of stock.
///
/// Split out so the movement service can reject malformed requests without
/// issuing any storage call.
pub fn validate_inputs(product_id: &str, quantity: i64) -> Result<(), MovementRejection> {
    if is_placeholder_product_id(product_id) {
        return Err(MovementRejection::ProductRequired);
    }
    if quantity <= 0 {
        return Err(MovementRejection::NonPositiveQuantity);
    }
    Ok(())
}

/// Decide whether a proposed movement is admissible given current stock.
///
/// `In` movements have no upper bound; `Out` movements must not drive stock
/// below zero.
pub fn validate_movement(
    product_id: &str,
    quantity: i64,
    kind: MovementKind,
    current_stock: i64,
) -> Result<(), MovementRejection> {
    validate_inputs(product_id, quantity)?;

    match kind {
        MovementKind::In => Ok(()),
        MovementKind::Out if current_stock == 0 => Err(MovementRejection::NoStockAvailable),
        MovementKind::Out if quantity > current_stock => {
            Err(MovementRejection::InsufficientStock {
                available: current_stock,
                requested: quantity,
            })
        }
        MovementKind::Out => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const PID: &str = "0192f1a0-0000-7000-8000-000000000001";

    #[test]
    fn out_within_stock_is_admissible() {
        // stock 50, ship 10
        assert_eq!(validate_movement(PID, 10, MovementKind::Out, 50), Ok(()));
    }

    #[test]
    fn out_of_empty_stock_reports_no_stock() {
        // shipping from an empty shelf
        assert_eq!(
            validate_movement(PID, 1, MovementKind::Out, 0),
            Err(MovementRejection::NoStockAvailable)
        );
        assert_eq!(
            MovementRejection::NoStockAvailable.to_string(),
            "no stock available"
        );
    }

    #[test]
    fn over_requesting_reports_both_amounts() {
        // requesting more than is on hand
        let err = validate_movement(PID, 10, MovementKind::Out, 5).unwrap_err();
        assert_eq!(
            err,
            MovementRejection::InsufficientStock {
                available: 5,
                requested: 10
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("Available: 5"));
        assert!(msg.contains("Requested: 10"));
    }

    #[test]
    fn empty_product_id_is_required() {
        assert_eq!(
            validate_movement("", 1, MovementKind::In, 0),
            Err(MovementRejection::ProductRequired)
        );
        assert_eq!(
            MovementRejection::ProductRequired.to_string(),
            "product is required"
        );
    }

    #[test]
    fn placeholder_id_counts_as_missing() {
        assert!(is_placeholder_product_id(""));
        assert!(is_placeholder_product_id("   "));
        assert!(is_placeholder_product_id("new"));
        assert!(!is_placeholder_product_id(PID));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert_eq!(
            validate_movement(PID, -5, MovementKind::In, 100),
            Err(MovementRejection::NonPositiveQuantity)
        );
        assert_eq!(
            validate_movement(PID, 0, MovementKind::Out, 100),
            Err(MovementRejection::NonPositiveQuantity)
        );
    }

    #[test]
    fn inbound_has_no_upper_bound() {
        assert_eq!(
            validate_movement(PID, i64::MAX, MovementKind::In, 0),
            Ok(())
        );
    }

    proptest! {
        /// An `out` of Q against stock S validates iff 0 < Q <= S.
        #[test]
        fn out_validates_iff_within_stock(s in 0i64..10_000, q in -100i64..10_000) {
            let result = validate_movement(PID, q, MovementKind::Out, s);
            if q > 0 && q <= s {
                prop_assert_eq!(result, Ok(()));
            } else {
                prop_assert!(result.is_err());
            }
        }

        /// Failure messages for over-requests carry both amounts.
        #[test]
        fn insufficient_message_carries_amounts(s in 1i64..1_000, extra in 1i64..1_000) {
            let q = s + extra;
            let msg = validate_movement(PID, q, MovementKind::Out, s).unwrap_err().to_string();
            let available = format!("Available: {s}");
            let requested = format!("Requested: {q}");
            prop_assert!(msg.contains(&available));
            prop_assert!(msg.contains(&requested));
        }

        /// An `in` of positive Q with a real product id always validates.
        #[test]
        fn inbound_always_validates(s in 0i64..10_000, q in 1i64..10_000) {
            prop_assert_eq!(validate_movement(PID, q, MovementKind::In, s), Ok(()));
        }
    }
}
