//! Delivery receipts
//!
//! A receipt is tied to an existing invoice and starts `pending`. It has no
//! inventory effect.

use serde::{Deserialize, Serialize};
use shared::models::{DeliveryReceipt, DeliveryStatus, Invoice};
use shared::types::Timestamp;
use shared::util::{new_record_id, now_millis};

use super::error::{ValidationError, WorkflowError, WorkflowResult};
use super::phase::WorkflowPhase;
use crate::db::PosStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRequest {
    pub invoice_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivered_by: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to now
    #[serde(default)]
    pub delivery_date: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub struct DeliveryWorkflow {
    store: PosStore,
}

fn required(value: &str, field: &'static str) -> WorkflowResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WorkflowError::rejected(
            WorkflowPhase::EnteringDetails,
            ValidationError::RequiredField(field),
        ));
    }
    Ok(value.to_string())
}

impl DeliveryWorkflow {
    pub fn new(store: PosStore) -> Self {
        Self { store }
    }

    pub async fn submit(&self, request: DeliveryRequest) -> WorkflowResult<DeliveryReceipt> {
        let invoice: Invoice = self
            .store
            .get(&request.invoice_id)
            .await
            .map_err(WorkflowError::store(WorkflowPhase::SelectingTarget))?
            .ok_or_else(|| {
                WorkflowError::rejected(
                    WorkflowPhase::SelectingTarget,
                    ValidationError::InvoiceNotFound(request.invoice_id.clone()),
                )
            })?;

        let receipt = DeliveryReceipt {
            id: new_record_id(),
            invoice_id: invoice.id,
            customer_name: required(&request.customer_name, "customerName")?,
            customer_phone: required(&request.customer_phone, "customerPhone")?,
            delivery_address: required(&request.delivery_address, "deliveryAddress")?,
            delivery_date: request.delivery_date.unwrap_or_else(now_millis),
            delivered_by: required(&request.delivered_by, "deliveredBy")?,
            status: DeliveryStatus::Pending,
            notes: request
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
        };

        self.store
            .add(&receipt)
            .await
            .map_err(WorkflowError::store(WorkflowPhase::Submitting))?;

        tracing::info!(
            target: "audit",
            receipt_id = %receipt.id,
            invoice_id = %receipt.invoice_id,
            delivered_by = %receipt.delivered_by,
            "Delivery receipt issued"
        );
        Ok(receipt)
    }

    /// Receipts issued for an invoice
    pub async fn for_invoice(&self, invoice_id: &str) -> WorkflowResult<Vec<DeliveryReceipt>> {
        self.store
            .list_by_index("invoiceId", invoice_id)
            .await
            .map_err(WorkflowError::store(WorkflowPhase::SelectingTarget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::error::ErrorCode;
    use shared::models::PaymentMethod;

    async fn setup() -> (PosStore, DeliveryWorkflow) {
        let store = PosStore::open_in_memory().unwrap();
        let invoice = Invoice::assemble(
            "inv-1".into(),
            vec![],
            Decimal::ZERO,
            PaymentMethod::Transfer,
            Some("Karim".into()),
            None,
            0,
        )
        .unwrap();
        store.add(&invoice).await.unwrap();
        (store.clone(), DeliveryWorkflow::new(store))
    }

    fn request() -> DeliveryRequest {
        DeliveryRequest {
            invoice_id: "inv-1".into(),
            customer_name: "Karim".into(),
            customer_phone: "0661000000".into(),
            delivery_address: "Oran".into(),
            delivered_by: "Yacine".into(),
            notes: Some("".into()),
            delivery_date: Some(42),
        }
    }

    #[tokio::test]
    async fn test_receipt_is_pending() {
        let (_, delivery) = setup().await;
        let receipt = delivery.submit(request()).await.unwrap();
        assert_eq!(receipt.status, DeliveryStatus::Pending);
        assert_eq!(receipt.delivery_date, 42);
        assert_eq!(receipt.notes, None);
        assert_eq!(delivery.for_invoice("inv-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_receipt_requires_invoice_and_fields() {
        let (store, delivery) = setup().await;

        let mut req = request();
        req.invoice_id = "missing".into();
        let err = delivery.submit(req).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvoiceNotFound);

        let mut req = request();
        req.delivery_address = "".into();
        let err = delivery.submit(req).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::RequiredField);

        assert_eq!(store.count::<DeliveryReceipt>().await.unwrap(), 0);
    }
}
