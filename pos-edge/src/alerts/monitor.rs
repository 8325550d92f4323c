//! Stock alert monitor
//!
//! Tiers: `out_of_stock` at quantity ≤ 0 (threshold 0), else `low_stock` at
//! quantity ≤ the low-stock threshold.
//!
//! Dedup: a product with any unacknowledged alert gets no new one. Scans
//! issued through one monitor (and its clones) are serialized, so they cannot
//! both miss each other's alerts. Two independently constructed monitors on the
//! same store can still race and create a duplicate; the next acknowledge
//! clears only one of them.

use std::collections::HashSet;
use std::sync::Arc;

use shared::models::{AlertType, Product, StockAlert};
use shared::types::Quantity;
use shared::util::{new_record_id, now_millis};
use tokio::sync::Mutex;

use crate::db::{Modification, PosStore, StoreResult};

pub const DEFAULT_LOW_STOCK_THRESHOLD: Quantity = 5;

/// Alert tier and threshold for a quantity, or `None` when stock is healthy
pub fn alert_tier(quantity: Quantity, low_stock_threshold: Quantity) -> Option<(AlertType, Quantity)> {
    if quantity <= 0 {
        Some((AlertType::OutOfStock, 0))
    } else if quantity <= low_stock_threshold {
        Some((AlertType::LowStock, low_stock_threshold))
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StockAlertMonitor {
    store: PosStore,
    low_stock_threshold: Quantity,
    scan_lock: Arc<Mutex<()>>,
}

impl StockAlertMonitor {
    pub fn new(store: PosStore) -> Self {
        Self::with_threshold(store, DEFAULT_LOW_STOCK_THRESHOLD)
    }

    pub fn with_threshold(store: PosStore, low_stock_threshold: Quantity) -> Self {
        Self {
            store,
            low_stock_threshold,
            scan_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn low_stock_threshold(&self) -> Quantity {
        self.low_stock_threshold
    }

    /// Create alerts for products crossing a threshold; returns the new alerts.
    pub async fn scan(&self) -> StoreResult<Vec<StockAlert>> {
        let _guard = self.scan_lock.lock().await;

        let products: Vec<Product> = self.store.get_all().await?;
        let open: Vec<StockAlert> = self.store.list_by_index("acknowledged", "false").await?;
        let mut alerted: HashSet<String> = open.into_iter().map(|a| a.product_id).collect();

        let mut created = Vec::new();
        for product in products {
            let Some((alert_type, threshold)) = alert_tier(product.quantity, self.low_stock_threshold)
            else {
                continue;
            };
            if alerted.contains(&product.id) {
                continue;
            }

            let alert = StockAlert {
                id: new_record_id(),
                product_id: product.id.clone(),
                current_quantity: product.quantity,
                product,
                alert_type,
                threshold,
                created_at: now_millis(),
                acknowledged: false,
            };
            self.store.add(&alert).await?;
            tracing::info!(
                alert_id = %alert.id,
                product_id = %alert.product_id,
                alert_type = alert.alert_type.as_str(),
                quantity = alert.current_quantity,
                "Stock alert raised"
            );
            alerted.insert(alert.product_id.clone());
            created.push(alert);
        }

        if !created.is_empty() {
            tracing::info!(count = created.len(), "Stock scan created alerts");
        }
        Ok(created)
    }

    /// Mark an alert acknowledged; a missing id is a no-op returning `None`.
    pub async fn acknowledge(&self, alert_id: &str) -> StoreResult<Option<StockAlert>> {
        let alert = self
            .store
            .modify::<StockAlert, _, _>(alert_id, |alert| {
                if alert.acknowledged {
                    Modification::Keep(alert.clone())
                } else {
                    alert.acknowledged = true;
                    Modification::Write(alert.clone())
                }
            })
            .await?;
        match &alert {
            Some(a) => tracing::info!(alert_id, product_id = %a.product_id, "Stock alert acknowledged"),
            None => tracing::debug!(alert_id, "Acknowledge skipped: alert not found"),
        }
        Ok(alert)
    }

    /// Unacknowledged alerts, newest first
    pub async fn open_alerts(&self) -> StoreResult<Vec<StockAlert>> {
        let mut alerts: Vec<StockAlert> =
            self.store.list_by_index("acknowledged", "false").await?;
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }

    /// Every alert ever raised for a product, newest first
    pub async fn alerts_for_product(&self, product_id: &str) -> StoreResult<Vec<StockAlert>> {
        let mut alerts: Vec<StockAlert> = self.store.list_by_index("productId", product_id).await?;
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(alerts)
    }
}
