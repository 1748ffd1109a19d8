//! Reporting read models for the dashboard charts.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use stockdesk_inventory::{MovementKind, Product};

use crate::cache::StatsCache;
use crate::store::{CatalogStore, StockStore, StoreError};

const DASHBOARD_CACHE_KEY: &str = "reports.dashboard";

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub total_stock_units: i64,
    pub inventory_value_cents: u64,
    pub low_stock_count: usize,
    pub total_movements: usize,
}

/// One day of movement activity (chart series point).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyMovements {
    pub date: NaiveDate,
    pub inbound: i64,
    pub outbound: i64,
}

/// Computes report payloads, caching the dashboard stats until the next
/// write clears the cache.
pub struct ReportService<S> {
    store: Arc<S>,
    cache: Arc<StatsCache>,
}

impl<S: CatalogStore + StockStore> ReportService<S> {
    pub fn new(store: Arc<S>, cache: Arc<StatsCache>) -> Self {
        Self { store, cache }
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        if let Some(stats) = self.cache.get(DASHBOARD_CACHE_KEY).as_ref().and_then(from_cached) {
            return Ok(stats);
        }

        let products = self.store.list_products()?;
        let movements = self.store.list_movements(None)?;

        let stats = DashboardStats {
            total_products: products.len(),
            total_stock_units: products
                .iter()
                .map(|p| p.quantity)
                .fold(0i64, i64::saturating_add),
            inventory_value_cents: products
                .iter()
                .map(Product::stock_value_cents)
                .fold(0u64, u64::saturating_add),
            low_stock_count: products.iter().filter(|p| p.is_low_stock()).count(),
            total_movements: movements.len(),
        };

        if let Ok(value) = serde_json::to_value(&stats) {
            self.cache.insert(DASHBOARD_CACHE_KEY, value);
        }
        Ok(stats)
    }

    /// Products at or below their configured minimum stock.
    pub fn low_stock_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut products = self.store.list_products()?;
        products.retain(Product::is_low_stock);
        Ok(products)
    }

    /// In/out totals per day over the trailing `days` window (today
    /// inclusive), oldest first. Empty days are present with zero totals so
    /// chart axes stay contiguous.
    pub fn movements_per_day(&self, days: u32) -> Result<Vec<DailyMovements>, StoreError> {
        let days = days.clamp(1, 365);
        let today = Utc::now().date_naive();
        let first = today - Duration::days(i64::from(days) - 1);

        let mut series: Vec<DailyMovements> = (0..days)
            .map(|offset| DailyMovements {
                date: first + Duration::days(i64::from(offset)),
                inbound: 0,
                outbound: 0,
            })
            .collect();

        for movement in self.store.list_movements(None)? {
            let date = movement.occurred_at.date_naive();
            if date < first || date > today {
                continue;
            }
            let idx = (date - first).num_days() as usize;
            let point = &mut series[idx];
            match movement.kind {
                MovementKind::In => point.inbound = point.inbound.saturating_add(movement.quantity),
                MovementKind::Out => {
                    point.outbound = point.outbound.saturating_add(movement.quantity)
                }
            }
        }

        Ok(series)
    }
}

fn from_cached(value: &serde_json::Value) -> Option<DashboardStats> {
    Some(DashboardStats {
        total_products: value.get("total_products")?.as_u64()? as usize,
        total_stock_units: value.get("total_stock_units")?.as_i64()?,
        inventory_value_cents: value.get("inventory_value_cents")?.as_u64()?,
        low_stock_count: value.get("low_stock_count")?.as_u64()? as usize,
        total_movements: value.get("total_movements")?.as_u64()? as usize,
    })
}

#[cfg(test)]
mod tests {
    use stockdesk_core::ProductId;
    use stockdesk_inventory::StockMovement;

    use crate::store::InMemoryStore;

    use super::*;

    fn store_with_products() -> (Arc<InMemoryStore>, ProductId) {
        let store = Arc::new(InMemoryStore::new());

        let mut beans = Product::new(ProductId::new(), "Beans", 1000)
            .unwrap()
            .with_minimum_stock(5);
        beans.quantity = 20;
        let beans_id = beans.id;

        let mut paper = Product::new(ProductId::new(), "Paper", 200)
            .unwrap()
            .with_minimum_stock(10);
        paper.quantity = 4; // below threshold

        store.insert_product(beans).unwrap();
        store.insert_product(paper).unwrap();
        (store, beans_id)
    }

    #[test]
    fn dashboard_stats_aggregate_the_catalog() {
        let (store, _) = store_with_products();
        let reports = ReportService::new(store, Arc::new(StatsCache::new()));

        let stats = reports.dashboard_stats().unwrap();
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_stock_units, 24);
        assert_eq!(stats.inventory_value_cents, 20 * 1000 + 4 * 200);
        assert_eq!(stats.low_stock_count, 1);
    }

    #[test]
    fn dashboard_stats_are_cached_until_cleared() {
        let (store, id) = store_with_products();
        let cache = Arc::new(StatsCache::new());
        let reports = ReportService::new(Arc::clone(&store), Arc::clone(&cache));

        let before = reports.dashboard_stats().unwrap();
        store.update_product_quantity(&id, -5).unwrap();

        // Stale until a write path clears the cache.
        assert_eq!(reports.dashboard_stats().unwrap(), before);
        cache.clear();
        assert_eq!(reports.dashboard_stats().unwrap().total_stock_units, 19);
    }

    #[test]
    fn low_stock_lists_only_breached_thresholds() {
        let (store, _) = store_with_products();
        let reports = ReportService::new(store, Arc::new(StatsCache::new()));

        let low = reports.low_stock_products().unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Paper");
    }

    #[test]
    fn movement_series_saturates_on_extreme_quantities() {
        let (store, id) = store_with_products();
        store
            .record_movement(StockMovement::new(id, i64::MAX, MovementKind::In))
            .unwrap();
        store
            .record_movement(StockMovement::new(id, i64::MAX, MovementKind::In))
            .unwrap();

        let reports = ReportService::new(store, Arc::new(StatsCache::new()));
        let series = reports.movements_per_day(1).unwrap();
        assert_eq!(series[0].inbound, i64::MAX);
    }

    #[test]
    fn movement_series_covers_the_whole_window() {
        let (store, id) = store_with_products();
        store
            .record_movement(StockMovement::new(id, 8, MovementKind::In))
            .unwrap();
        store
            .record_movement(StockMovement::new(id, 3, MovementKind::Out))
            .unwrap();

        let reports = ReportService::new(store, Arc::new(StatsCache::new()));
        let series = reports.movements_per_day(7).unwrap();

        assert_eq!(series.len(), 7);
        let today = series.last().unwrap();
        assert_eq!(today.inbound, 8);
        assert_eq!(today.outbound, 3);
        assert!(series[..6].iter().all(|d| d.inbound == 0 && d.outbound == 0));
    }
}
