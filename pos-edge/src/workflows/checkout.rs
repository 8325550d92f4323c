//! Checkout
//!
//! Commit order:
//! 1. compute subtotal and total exactly
//! 2. `add` the invoice, snapshotting every cart line
//! 3. decrement stock per line through [`InventoryLedger::apply_delta_if_present`]
//!
//! A line whose product was deleted after it entered the cart moves no stock;
//! the sale still commits. If step 2 fails nothing has moved. If a step-3
//! adjustment fails in the store the invoice
//! and the earlier adjustments stay; the caller gets
//! [`WorkflowError::PartiallyApplied`] and the gap is logged at error level.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Invoice, InvoiceItem, PaymentMethod};
use shared::util::{new_record_id, now_millis};

use super::cart::Cart;
use super::error::{FailedAdjustment, ValidationError, WorkflowError, WorkflowResult};
use super::phase::WorkflowPhase;
use crate::db::PosStore;
use crate::inventory::{AdjustReason, InventoryLedger, QuantityChange};

/// Payment details entered at the till
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDetails {
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

/// Committed sale
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub invoice: Invoice,
    pub stock_changes: Vec<QuantityChange>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct CheckoutWorkflow {
    store: PosStore,
    ledger: InventoryLedger,
}

impl CheckoutWorkflow {
    pub fn new(store: PosStore, ledger: InventoryLedger) -> Self {
        Self { store, ledger }
    }

    /// Local checks only; nothing is read or written.
    pub fn validate(cart: &Cart, details: &CheckoutDetails) -> WorkflowResult<()> {
        if cart.is_empty() {
            return Err(WorkflowError::rejected(
                WorkflowPhase::SelectingTarget,
                ValidationError::CartEmpty,
            ));
        }
        let subtotal = cart.subtotal().ok_or_else(|| {
            WorkflowError::rejected(
                WorkflowPhase::SelectingTarget,
                ValidationError::AmountOutOfRange,
            )
        })?;
        if details.discount < Decimal::ZERO || details.discount > subtotal {
            return Err(WorkflowError::rejected(
                WorkflowPhase::EnteringDetails,
                ValidationError::InvalidDiscount {
                    discount: details.discount,
                    subtotal,
                },
            ));
        }
        Ok(())
    }

    /// Turn the cart into an invoice and move stock.
    ///
    /// The cart is cleared once the invoice is recorded, including on
    /// `PartiallyApplied`, so the same cart cannot be billed twice.
    pub async fn checkout(
        &self,
        cart: &mut Cart,
        details: CheckoutDetails,
    ) -> WorkflowResult<CheckoutReceipt> {
        Self::validate(cart, &details)?;

        let out_of_range = || {
            WorkflowError::rejected(
                WorkflowPhase::EnteringDetails,
                ValidationError::AmountOutOfRange,
            )
        };
        let items = cart
            .lines()
            .iter()
            .map(|line| InvoiceItem::new(line.product.clone(), line.quantity, line.unit_price))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(out_of_range)?;
        let invoice = Invoice::assemble(
            new_record_id(),
            items,
            details.discount,
            details.payment_method,
            non_blank(details.customer_name),
            non_blank(details.customer_phone),
            now_millis(),
        )
        .ok_or_else(out_of_range)?;

        self.store
            .add(&invoice)
            .await
            .map_err(WorkflowError::store(WorkflowPhase::Submitting))?;
        cart.clear();

        let mut stock_changes = Vec::with_capacity(invoice.items.len());
        let mut failed = Vec::new();
        for item in &invoice.items {
            match self
                .ledger
                .apply_delta_if_present(&item.product_id, -item.quantity, AdjustReason::Sale)
                .await
            {
                Ok(Some(change)) => stock_changes.push(change),
                Ok(None) => {}
                Err(error) => {
                    tracing::error!(
                        invoice_id = %invoice.id,
                        product_id = %item.product_id,
                        quantity = item.quantity,
                        error = %error,
                        "Stock not decremented for recorded invoice"
                    );
                    failed.push(FailedAdjustment {
                        product_id: item.product_id.clone(),
                        delta: -item.quantity,
                        error,
                    });
                }
            }
        }

        if !failed.is_empty() {
            return Err(WorkflowError::PartiallyApplied {
                record_id: invoice.id,
                failed,
            });
        }

        tracing::info!(
            target: "audit",
            invoice_id = %invoice.id,
            total = %invoice.total,
            lines = invoice.items.len(),
            payment_method = invoice.payment_method.as_str(),
            "Sale committed"
        );
        Ok(CheckoutReceipt {
            invoice,
            stock_changes,
        })
    }
}
