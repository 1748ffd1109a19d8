//! Infrastructure wiring for the HTTP app.

use std::sync::Arc;

use stockdesk_events::{ChangeEvent, ChangeHub, ChangeOp, Table};
use stockdesk_core::ProductId;
use stockdesk_infra::{
    InMemoryStore, MovementService, ReportService, StatsCache,
};

/// Shared service graph handed to handlers via `Extension`.
pub struct AppServices {
    store: Arc<InMemoryStore>,
    hub: Arc<ChangeHub>,
    stats: Arc<StatsCache>,
    movements: MovementService<InMemoryStore>,
    reports: ReportService<InMemoryStore>,
}

impl AppServices {
    pub fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    pub fn hub(&self) -> &Arc<ChangeHub> {
        &self.hub
    }

    pub fn movements(&self) -> &MovementService<InMemoryStore> {
        &self.movements
    }

    pub fn reports(&self) -> &ReportService<InMemoryStore> {
        &self.reports
    }

    /// Publish a catalog/supplier change and invalidate cached reports.
    ///
    /// Movement writes do this themselves inside the movement service.
    pub fn notify_change(&self, table: Table, op: ChangeOp, product_id: Option<ProductId>) {
        self.stats.clear();
        self.hub.publish(ChangeEvent::now(table, op, product_id));
    }
}

pub fn build_services() -> AppServices {
    let store = Arc::new(InMemoryStore::new());
    let hub = Arc::new(ChangeHub::new());
    let stats = Arc::new(StatsCache::new());

    let movements = MovementService::new(
        Arc::clone(&store),
        Arc::clone(&hub),
        Arc::clone(&stats),
    );
    let reports = ReportService::new(Arc::clone(&store), Arc::clone(&stats));

    AppServices {
        store,
        hub,
        stats,
        movements,
        reports,
    }
}
