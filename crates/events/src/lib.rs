//! `stockdesk-events` — change-notification channel.
//!
//! The store publishes a [`ChangeEvent`] for every committed write; consumers
//! subscribe with a [`ChangeFilter`] and pull events from a cancellable
//! subscription. The hub makes no transport assumptions beyond "in-process".

pub mod change;
pub mod hub;

pub use change::{ChangeEvent, ChangeFilter, ChangeOp, Table};
pub use hub::{ChangeHub, ChangeSubscription, RecvError};
