//! In-process change hub (pub/sub).
//!
//! - No IO / no async
//! - Best-effort fan-out with per-subscription filters
//! - At-least-once acceptable (consumers refresh idempotently)
//!
//! Cancellation contract: `ChangeSubscription::cancel` may be called any
//! number of times; once cancelled, no further event is ever handed out,
//! including events that were already queued before the cancel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::change::{ChangeEvent, ChangeFilter};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecvError {
    /// The subscription was cancelled locally.
    #[error("subscription cancelled")]
    Cancelled,

    /// No event arrived within the timeout.
    #[error("timed out waiting for a change event")]
    Timeout,

    /// The hub side went away.
    #[error("change hub disconnected")]
    Disconnected,
}

struct Registration {
    filter: ChangeFilter,
    sender: mpsc::Sender<ChangeEvent>,
    cancelled: Arc<AtomicBool>,
}

/// Hub distributing change events to filtered subscriptions.
#[derive(Default)]
pub struct ChangeHub {
    registrations: Mutex<Vec<Registration>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a change to every live subscription whose filter matches.
    ///
    /// Dead and cancelled subscriptions are pruned while publishing.
    pub fn publish(&self, event: ChangeEvent) {
        let Ok(mut regs) = self.registrations.lock() else {
            return;
        };

        regs.retain(|reg| {
            if reg.cancelled.load(Ordering::Acquire) {
                return false;
            }
            if !reg.filter.matches(&event) {
                return true;
            }
            reg.sender.send(event.clone()).is_ok()
        });
    }

    /// Open a subscription for changes matching `filter`.
    pub fn subscribe(&self, filter: ChangeFilter) -> ChangeSubscription {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));

        // If the lock is poisoned, the subscription is still returned; it
        // just never receives events, which consumers treat as a degraded
        // channel (manual refresh).
        if let Ok(mut regs) = self.registrations.lock() {
            regs.push(Registration {
                filter,
                sender: tx,
                cancelled: Arc::clone(&cancelled),
            });
        }

        ChangeSubscription {
            receiver: rx,
            cancelled,
        }
    }

    /// Number of live subscriptions (cancelled ones may linger until the
    /// next publish prunes them).
    pub fn subscription_count(&self) -> usize {
        self.registrations
            .lock()
            .map(|regs| {
                regs.iter()
                    .filter(|r| !r.cancelled.load(Ordering::Acquire))
                    .count()
            })
            .unwrap_or(0)
    }
}

impl core::fmt::Debug for ChangeHub {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChangeHub")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

/// A cancellable, pull-based stream of change events.
#[derive(Debug)]
pub struct ChangeSubscription {
    receiver: mpsc::Receiver<ChangeEvent>,
    cancelled: Arc<AtomicBool>,
}

impl ChangeSubscription {
    /// Block for up to `timeout` waiting for the next matching event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ChangeEvent, RecvError> {
        if self.is_cancelled() {
            return Err(RecvError::Cancelled);
        }

        match self.receiver.recv_timeout(timeout) {
            Ok(event) => {
                // The cancel may have landed while we were blocked; queued
                // events must not leak past teardown.
                if self.is_cancelled() {
                    Err(RecvError::Cancelled)
                } else {
                    Ok(event)
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => Err(RecvError::Timeout),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RecvError::Disconnected),
        }
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Result<ChangeEvent, RecvError> {
        if self.is_cancelled() {
            return Err(RecvError::Cancelled);
        }
        match self.receiver.try_recv() {
            Ok(event) if !self.is_cancelled() => Ok(event),
            Ok(_) => Err(RecvError::Cancelled),
            Err(mpsc::TryRecvError::Empty) => Err(RecvError::Timeout),
            Err(mpsc::TryRecvError::Disconnected) => Err(RecvError::Disconnected),
        }
    }

    /// Cancel the subscription. Idempotent; releases the hub registration
    /// on the next publish.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
