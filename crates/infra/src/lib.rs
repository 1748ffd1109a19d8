//! `stockdesk-infra` — storage and service layer.
//!
//! Stores are behind traits so the HTTP layer and tests share one wiring;
//! the in-memory implementation is the authoritative store and enforces the
//! non-negative stock invariant inside its atomic quantity update.

pub mod cache;
pub mod reports;
pub mod service;
pub mod store;
pub mod sync;
pub mod view;

pub use cache::StatsCache;
pub use reports::{DailyMovements, DashboardStats, ReportService};
pub use service::{MovementOutcome, MovementService, NewMovement, RejectionClass};
pub use store::{CatalogStore, InMemoryStore, StockStore, StoreError, SupplierStore};
pub use sync::{StockSyncWorker, SyncState};
pub use view::StockView;
