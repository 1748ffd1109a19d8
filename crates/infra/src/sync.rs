//! Realtime stock synchronization worker.
//!
//! Owns a hub subscription and keeps a [`StockView`] in step with the store:
//! any matching change triggers an idempotent refresh. Eventual consistency
//! only; bursts of notifications coalesce into a single refresh.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::warn;

use stockdesk_events::{ChangeFilter, ChangeHub, ChangeSubscription, RecvError};

use crate::view::StockView;

/// Subscription lifecycle for one worker instance.
///
/// `Idle -> Subscribing -> Subscribed -> (event) Refreshing -> Subscribed`;
/// teardown ends in `Unsubscribed`, terminal for the instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Subscribing,
    Subscribed,
    Refreshing,
    Unsubscribed,
}

/// Handle to a background sync worker.
#[derive(Debug)]
pub struct StockSyncWorker {
    state: Arc<Mutex<SyncState>>,
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl StockSyncWorker {
    /// Subscribe and start refreshing `view` on matching changes.
    ///
    /// The worker performs one initial refresh so the view leaves its
    /// loading state even if no change ever arrives.
    pub fn spawn(hub: &ChangeHub, filter: ChangeFilter, view: Arc<StockView>) -> Self {
        let state = Arc::new(Mutex::new(SyncState::Idle));
        set_state(&state, SyncState::Subscribing);

        let subscription = hub.subscribe(filter);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let worker_state = Arc::clone(&state);
        let join = thread::Builder::new()
            .name("stock-sync".to_string())
            .spawn(move || worker_loop(subscription, shutdown_rx, worker_state, view))
            .expect("failed to spawn stock sync worker thread");

        Self {
            state,
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(SyncState::Unsubscribed)
    }

    /// Request graceful teardown and wait for the worker to stop.
    ///
    /// After this returns no further refresh is ever triggered by this
    /// instance. Safe to call once; dropping the handle does the same.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
        set_state(&self.state, SyncState::Unsubscribed);
    }
}

impl Drop for StockSyncWorker {
    fn drop(&mut self) {
        if self.join.is_some() {
            self.shutdown_inner();
        }
    }
}

fn set_state(state: &Mutex<SyncState>, next: SyncState) {
    if let Ok(mut s) = state.lock() {
        *s = next;
    }
}

fn worker_loop(
    subscription: ChangeSubscription,
    shutdown_rx: mpsc::Receiver<()>,
    state: Arc<Mutex<SyncState>>,
    view: Arc<StockView>,
) {
    let tick = Duration::from_millis(100);

    set_state(&state, SyncState::Subscribed);

    // Initial refresh: resolves the view's first load.
    set_state(&state, SyncState::Refreshing);
    view.refresh();
    set_state(&state, SyncState::Subscribed);

    loop {
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match subscription.recv_timeout(tick) {
            Ok(_event) => {
                // Coalesce a burst of notifications into one refresh;
                // re-reading current stock is idempotent.
                while subscription.try_recv().is_ok() {}

                set_state(&state, SyncState::Refreshing);
                view.refresh();
                set_state(&state, SyncState::Subscribed);
            }
            Err(RecvError::Timeout) => continue,
            Err(RecvError::Cancelled) | Err(RecvError::Disconnected) => {
                // Channel is gone: degrade to manual refresh, don't crash
                // the view.
                warn!("change subscription lost, stock view degrades to manual refresh");
                break;
            }
        }
    }

    subscription.cancel();
    set_state(&state, SyncState::Unsubscribed);
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use stockdesk_core::ProductId;
    use stockdesk_events::{ChangeEvent, ChangeOp, Table};
    use stockdesk_inventory::Product;

    use crate::store::{CatalogStore, InMemoryStore, StockStore};

    use super::*;

    fn wait_until(deadline: Duration, mut check: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if check() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn setup(quantity: i64) -> (Arc<InMemoryStore>, Arc<ChangeHub>, Arc<StockView>, ProductId) {
        let store = Arc::new(InMemoryStore::new());
        let hub = Arc::new(ChangeHub::new());

        let mut product = Product::new(ProductId::new(), "Widget", 100).unwrap();
        product.quantity = quantity;
        let id = product.id;
        store.insert_product(product).unwrap();

        let view = Arc::new(StockView::new(
            Arc::clone(&store) as Arc<dyn StockStore>,
            &id.to_string(),
        ));
        (store, hub, view, id)
    }

    #[test]
    fn initial_refresh_resolves_loading() {
        let (_store, hub, view, id) = setup(12);
        let worker = StockSyncWorker::spawn(&hub, ChangeFilter::product(id), Arc::clone(&view));

        assert!(wait_until(Duration::from_secs(2), || !view.is_loading()));
        assert_eq!(view.current_stock(), 12);
        assert!(wait_until(Duration::from_secs(2), || {
            worker.state() == SyncState::Subscribed
        }));
        worker.shutdown();
    }

    #[test]
    fn change_event_triggers_refresh() {
        let (store, hub, view, id) = setup(10);
        let worker = StockSyncWorker::spawn(&hub, ChangeFilter::product(id), Arc::clone(&view));
        assert!(wait_until(Duration::from_secs(2), || !view.is_loading()));

        store.update_product_quantity(&id, -3).unwrap();
        hub.publish(ChangeEvent::now(Table::Products, ChangeOp::Update, Some(id)));

        assert!(wait_until(Duration::from_secs(2), || view.current_stock() == 7));
        worker.shutdown();
    }

    #[test]
    fn unrelated_products_are_ignored() {
        let (store, hub, view, id) = setup(10);
        let worker = StockSyncWorker::spawn(&hub, ChangeFilter::product(id), Arc::clone(&view));
        assert!(wait_until(Duration::from_secs(2), || !view.is_loading()));

        // Mutate our product directly but only announce someone else's.
        store.update_product_quantity(&id, -3).unwrap();
        hub.publish(ChangeEvent::now(
            Table::Products,
            ChangeOp::Update,
            Some(ProductId::new()),
        ));

        thread::sleep(Duration::from_millis(150));
        assert_eq!(view.current_stock(), 10);
        worker.shutdown();
    }

    #[test]
    fn shutdown_is_terminal_and_stops_callbacks() {
        let (store, hub, view, id) = setup(10);
        let worker = StockSyncWorker::spawn(&hub, ChangeFilter::product(id), Arc::clone(&view));
        assert!(wait_until(Duration::from_secs(2), || !view.is_loading()));

        worker.shutdown();

        // Writes after teardown never reach the view.
        store.update_product_quantity(&id, -5).unwrap();
        hub.publish(ChangeEvent::now(Table::Products, ChangeOp::Update, Some(id)));
        thread::sleep(Duration::from_millis(150));
        assert_eq!(view.current_stock(), 10);
    }

    #[test]
    fn drop_tears_the_worker_down() {
        let (_store, hub, view, id) = setup(10);
        {
            let _worker =
                StockSyncWorker::spawn(&hub, ChangeFilter::product(id), Arc::clone(&view));
            assert!(wait_until(Duration::from_secs(2), || !view.is_loading()));
        }
        // Subscription was cancelled; next publish prunes it.
        hub.publish(ChangeEvent::now(Table::Products, ChangeOp::Update, Some(id)));
        assert_eq!(hub.subscription_count(), 0);
    }
}
