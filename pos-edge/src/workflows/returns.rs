//! Returns against an invoice line
//!
//! The requested quantity is checked against the line's purchased quantity
//! for this request only; earlier returns of the same line are not summed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Invoice, ReturnItem, ReturnStatus, line_total};
use shared::types::Quantity;
use shared::util::{new_record_id, now_millis};

use super::error::{FailedAdjustment, ValidationError, WorkflowError, WorkflowResult};
use super::phase::WorkflowPhase;
use crate::db::PosStore;
use crate::inventory::{AdjustReason, InventoryLedger, QuantityChange};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub invoice_id: String,
    pub product_id: String,
    pub quantity: Quantity,
    pub reason: String,
    /// Defaults to `quantity × line price`
    #[serde(default)]
    pub refund_amount: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct ReturnReceipt {
    pub item: ReturnItem,
    /// `None` when the product was deleted after the sale
    pub stock_change: Option<QuantityChange>,
}

#[derive(Debug, Clone)]
pub struct ReturnWorkflow {
    store: PosStore,
    ledger: InventoryLedger,
}

impl ReturnWorkflow {
    pub fn new(store: PosStore, ledger: InventoryLedger) -> Self {
        Self { store, ledger }
    }

    /// Refund the UI pre-fills for a line and quantity
    pub fn suggested_refund(invoice: &Invoice, product_id: &str, quantity: Quantity) -> Option<Decimal> {
        invoice
            .line_for(product_id)
            .and_then(|line| line_total(line.price, quantity))
    }

    pub async fn submit(&self, request: ReturnRequest) -> WorkflowResult<ReturnReceipt> {
        // Target: the invoice line
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
        let line = invoice.line_for(&request.product_id).ok_or_else(|| {
            WorkflowError::rejected(
                WorkflowPhase::SelectingTarget,
                ValidationError::InvoiceLineNotFound {
                    invoice_id: invoice.id.clone(),
                    product_id: request.product_id.clone(),
                },
            )
        })?;

        // Details
        let reject = |reason| WorkflowError::rejected(WorkflowPhase::EnteringDetails, reason);
        if request.quantity < 1 {
            return Err(reject(ValidationError::InvalidQuantity(request.quantity)));
        }
        if request.quantity > line.quantity {
            return Err(reject(ValidationError::ReturnQuantityExceeded {
                requested: request.quantity,
                purchased: line.quantity,
            }));
        }
        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(reject(ValidationError::RequiredField("reason")));
        }
        let refund_amount = match request.refund_amount {
            Some(amount) => amount,
            None => line_total(line.price, request.quantity)
                .ok_or_else(|| reject(ValidationError::AmountOutOfRange))?,
        };
        if refund_amount < Decimal::ZERO {
            return Err(reject(ValidationError::InvalidRefundAmount(refund_amount)));
        }

        // Submit
        let item = ReturnItem {
            id: new_record_id(),
            original_invoice_id: invoice.id.clone(),
            product_id: line.product_id.clone(),
            product: line.product.clone(),
            quantity: request.quantity,
            reason: reason.to_string(),
            return_date: now_millis(),
            refund_amount,
            status: ReturnStatus::Pending,
        };
        self.store
            .add(&item)
            .await
            .map_err(WorkflowError::store(WorkflowPhase::Submitting))?;

        let stock_change = match self
            .ledger
            .apply_delta_if_present(&item.product_id, item.quantity, AdjustReason::Return)
            .await
        {
            Ok(change) => change,
            Err(error) => {
                tracing::error!(
                    return_id = %item.id,
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %error,
                    "Stock not restored for recorded return"
                );
                return Err(WorkflowError::PartiallyApplied {
                    record_id: item.id,
                    failed: vec![FailedAdjustment {
                        product_id: request.product_id,
                        delta: request.quantity,
                        error,
                    }],
                });
            }
        };

        tracing::info!(
            target: "audit",
            return_id = %item.id,
            invoice_id = %item.original_invoice_id,
            product_id = %item.product_id,
            quantity = item.quantity,
            refund = %item.refund_amount,
            "Return recorded"
        );
        Ok(ReturnReceipt { item, stock_change })
    }
}
