//! Inventory domain module.
//!
//! This crate contains business rules for stock, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod movement;
pub mod product;
pub mod validator;

pub use movement::{MovementKind, StockMovement};
pub use product::Product;
pub use validator::{
    is_placeholder_product_id, validate_inputs, validate_movement, MovementRejection,
};
