//! Supplier domain module.
//!
//! Suppliers are referenced by stock movements, never owned by them.

pub mod supplier;

pub use supplier::{ContactInfo, Supplier};
