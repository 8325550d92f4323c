//! Damage reports
//!
//! The record snapshots the product as it was when the report was filed;
//! stock then drops by the damaged amount, floored at zero.

use serde::{Deserialize, Serialize};
use shared::models::{DamageStatus, DamagedProduct, Product};
use shared::types::Quantity;
use shared::util::{new_record_id, now_millis};

use super::error::{FailedAdjustment, ValidationError, WorkflowError, WorkflowResult};
use super::phase::WorkflowPhase;
use crate::db::PosStore;
use crate::inventory::{AdjustReason, InventoryLedger, QuantityChange};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageRequest {
    pub product_id: String,
    pub quantity: Quantity,
    pub reason: String,
    pub reported_by: String,
}

#[derive(Debug, Clone)]
pub struct DamageReceipt {
    pub report: DamagedProduct,
    /// `None` when the product was deleted while the report was being filed
    pub stock_change: Option<QuantityChange>,
}

#[derive(Debug, Clone)]
pub struct DamageWorkflow {
    store: PosStore,
    ledger: InventoryLedger,
}

impl DamageWorkflow {
    pub fn new(store: PosStore, ledger: InventoryLedger) -> Self {
        Self { store, ledger }
    }

    pub async fn submit(&self, request: DamageRequest) -> WorkflowResult<DamageReceipt> {
        let product: Product = self
            .store
            .get(&request.product_id)
            .await
            .map_err(WorkflowError::store(WorkflowPhase::SelectingTarget))?
            .ok_or_else(|| {
                WorkflowError::rejected(
                    WorkflowPhase::SelectingTarget,
                    ValidationError::ProductNotFound(request.product_id.clone()),
                )
            })?;

        let reject = |reason| WorkflowError::rejected(WorkflowPhase::EnteringDetails, reason);
        if request.quantity < 1 {
            return Err(reject(ValidationError::InvalidQuantity(request.quantity)));
        }
        if request.quantity > product.quantity {
            return Err(reject(ValidationError::DamageQuantityExceeded {
                requested: request.quantity,
                available: product.quantity,
            }));
        }
        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(reject(ValidationError::RequiredField("reason")));
        }
        let reported_by = request.reported_by.trim();
        if reported_by.is_empty() {
            return Err(reject(ValidationError::RequiredField("reportedBy")));
        }

        let report = DamagedProduct {
            id: new_record_id(),
            product_id: product.id.clone(),
            product,
            quantity: request.quantity,
            reason: reason.to_string(),
            reported_by: reported_by.to_string(),
            reported_at: now_millis(),
            status: DamageStatus::Pending,
        };
        self.store
            .add(&report)
            .await
            .map_err(WorkflowError::store(WorkflowPhase::Submitting))?;

        let stock_change = match self
            .ledger
            .apply_delta_if_present(&report.product_id, -report.quantity, AdjustReason::Damage)
            .await
        {
            Ok(change) => change,
            Err(error) => {
                tracing::error!(
                    damage_id = %report.id,
                    product_id = %report.product_id,
                    quantity = report.quantity,
                    error = %error,
                    "Stock not decremented for recorded damage report"
                );
                return Err(WorkflowError::PartiallyApplied {
                    failed: vec![FailedAdjustment {
                        product_id: report.product_id,
                        delta: -report.quantity,
                        error,
                    }],
                    record_id: report.id,
                });
            }
        };

        tracing::info!(
            target: "audit",
            damage_id = %report.id,
            product_id = %report.product_id,
            quantity = report.quantity,
            reported_by = %report.reported_by,
            "Damage reported"
        );
        Ok(DamageReceipt {
            report,
            stock_change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::WorkflowOutcome;
    use rust_decimal::Decimal;
    use shared::error::ErrorCode;

    async fn setup(quantity: Quantity) -> (PosStore, DamageWorkflow) {
        let store = PosStore::open_in_memory().unwrap();
        store
            .add(&Product {
                id: "p1".into(),
                name: "Screen guard".into(),
                barcode: "300".into(),
                purchase_price: Decimal::from(20),
                sale_price: Decimal::from(50),
                quantity,
                category: "شاشات حماية".into(),
                description: None,
                image: None,
                created_at: 0,
                updated_at: 0,
            })
            .await
            .unwrap();
        let ledger = InventoryLedger::new(store.clone());
        (store.clone(), DamageWorkflow::new(store, ledger))
    }

    fn request(quantity: Quantity) -> DamageRequest {
        DamageRequest {
            product_id: "p1".into(),
            quantity,
            reason: "كسر".into(),
            reported_by: "Amine".into(),
        }
    }

    #[tokio::test]
    async fn test_damage_last_unit() {
        let (store, damage) = setup(1).await;

        let receipt = damage.submit(request(1)).await.unwrap();
        assert_eq!(receipt.report.status, DamageStatus::Pending);
        assert_eq!(receipt.report.product.quantity, 1, "snapshot taken before decrement");
        assert_eq!(receipt.stock_change.map(|c| c.current), Some(0));
        assert_eq!(store.require::<Product>("p1").await.unwrap().quantity, 0);

        let pending: Vec<DamagedProduct> = store.list_by_index("status", "pending").await.unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_damage_validation() {
        let (store, damage) = setup(2).await;

        let err = damage.submit(request(3)).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::DamageQuantityExceeded);

        let mut no_reporter = request(1);
        no_reporter.reported_by = " ".into();
        let err = damage.submit(no_reporter).await.unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::RequiredField("reportedBy")));

        let mut ghost = request(1);
        ghost.product_id = "ghost".into();
        let err = damage.submit(ghost).await.unwrap_err();
        assert_eq!(err.outcome(), WorkflowOutcome::ValidationRejected);
        assert_eq!(err.phase(), WorkflowPhase::SelectingTarget);

        assert_eq!(store.count::<DamagedProduct>().await.unwrap(), 0);
        assert_eq!(store.require::<Product>("p1").await.unwrap().quantity, 2);
    }
}
