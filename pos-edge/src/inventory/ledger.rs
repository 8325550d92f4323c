//! Inventory ledger
//!
//! Three ways to move stock:
//!
//! | Operation | Atomic | Floor at 0 |
//! |-----------|--------|------------|
//! | [`InventoryLedger::adjust_quantity`] | no (read, then write) | `Sale` only |
//! | [`InventoryLedger::compare_and_adjust_quantity`] | yes | caller decides |
//! | [`InventoryLedger::apply_delta`] | yes | `Sale` and `Damage` |
//!
//! `adjust_quantity` overwrites with a value the caller computed from an
//! earlier read. Two callers working from the same read both succeed and the
//! first write is lost. Transaction workflows therefore use `apply_delta`,
//! which reads and writes inside one redb write transaction.

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::Product;
use shared::types::Quantity;
use shared::util::now_millis;
use std::fmt;
use thiserror::Error;

use crate::db::{Modification, PosStore, StoreError};

/// Why a quantity changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustReason {
    Sale,
    Return,
    Damage,
    /// Manual stock correction
    Adjustment,
}

impl AdjustReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustReason::Sale => "sale",
            AdjustReason::Return => "return",
            AdjustReason::Damage => "damage",
            AdjustReason::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for AdjustReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A committed quantity change
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityChange {
    pub product_id: String,
    pub previous: Quantity,
    pub current: Quantity,
    pub reason: AdjustReason,
}

impl QuantityChange {
    /// Whether the floor swallowed part of the requested decrement
    pub fn was_clamped(&self, requested_delta: Quantity) -> bool {
        self.previous.saturating_add(requested_delta) != self.current
    }
}

/// Result of a compare-and-swap adjustment
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome {
    Applied(QuantityChange),
    /// Stock was not at the expected value; nothing written
    Conflict { actual: Quantity },
    Missing,
}

impl CasOutcome {
    /// Code to report when the swap did not apply
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            CasOutcome::Applied(_) => None,
            CasOutcome::Conflict { .. } => Some(ErrorCode::QuantityConflict),
            CasOutcome::Missing => Some(ErrorCode::ProductNotFound),
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            LedgerError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            LedgerError::Store(e) => e.error_code(),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ProductNotFound(id) => {
                AppError::new(ErrorCode::ProductNotFound).with_detail("productId", id)
            }
            LedgerError::Store(e) => e.into(),
        }
    }
}

/// Floor rule per reason
fn floor_for(reason: AdjustReason, quantity: Quantity) -> Quantity {
    match reason {
        AdjustReason::Sale | AdjustReason::Damage => quantity.max(0),
        AdjustReason::Return | AdjustReason::Adjustment => quantity,
    }
}

/// Stock mutation service
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    store: PosStore,
}

impl InventoryLedger {
    pub fn new(store: PosStore) -> Self {
        Self { store }
    }

    /// Overwrite a product's quantity (read, then write).
    ///
    /// The value is clamped to 0 only for [`AdjustReason::Sale`]. A missing
    /// product is a silent no-op returning `None`.
    ///
    /// Not atomic: a concurrent writer between the read and the write is
    /// overwritten. Use [`Self::apply_delta`] or
    /// [`Self::compare_and_adjust_quantity`] when that matters.
    pub async fn adjust_quantity(
        &self,
        product_id: &str,
        new_quantity: Quantity,
        reason: AdjustReason,
    ) -> LedgerResult<Option<Product>> {
        let Some(mut product) = self.store.get::<Product>(product_id).await? else {
            tracing::warn!(product_id, reason = %reason, "Quantity adjustment skipped: product not found");
            return Ok(None);
        };

        let previous = product.quantity;
        product.quantity = if reason == AdjustReason::Sale {
            new_quantity.max(0)
        } else {
            new_quantity
        };
        product.updated_at = now_millis();
        self.store.put(&product).await?;

        tracing::info!(
            product_id,
            previous,
            current = product.quantity,
            reason = %reason,
            "Quantity adjusted"
        );
        Ok(Some(product))
    }

    /// Set the quantity only if it still equals `expected_current`.
    ///
    /// No floor is applied; the caller chose `new_quantity` explicitly.
    pub async fn compare_and_adjust_quantity(
        &self,
        product_id: &str,
        expected_current: Quantity,
        new_quantity: Quantity,
        reason: AdjustReason,
    ) -> LedgerResult<CasOutcome> {
        let id = product_id.to_string();
        let outcome = self
            .store
            .modify::<Product, _, _>(product_id, move |product| {
                if product.quantity != expected_current {
                    return Modification::Keep(CasOutcome::Conflict {
                        actual: product.quantity,
                    });
                }
                let change = QuantityChange {
                    product_id: id,
                    previous: product.quantity,
                    current: new_quantity,
                    reason,
                };
                product.quantity = new_quantity;
                product.updated_at = now_millis();
                Modification::Write(CasOutcome::Applied(change))
            })
            .await?
            .unwrap_or(CasOutcome::Missing);

        match &outcome {
            CasOutcome::Applied(change) => tracing::info!(
                product_id,
                previous = change.previous,
                current = change.current,
                reason = %reason,
                "Quantity swapped"
            ),
            CasOutcome::Conflict { actual } => tracing::warn!(
                product_id,
                expected = expected_current,
                actual,
                "Quantity swap conflict"
            ),
            CasOutcome::Missing => {
                tracing::warn!(product_id, "Quantity swap skipped: product not found")
            }
        }
        Ok(outcome)
    }

    /// Add `delta` to the live quantity in one write transaction.
    ///
    /// `Sale` and `Damage` floor the result at 0.
    pub async fn apply_delta(
        &self,
        product_id: &str,
        delta: Quantity,
        reason: AdjustReason,
    ) -> LedgerResult<QuantityChange> {
        self.apply_delta_if_present(product_id, delta, reason)
            .await?
            .ok_or_else(|| LedgerError::ProductNotFound(product_id.to_string()))
    }

    /// [`Self::apply_delta`], but a missing product is a no-op returning `None`.
    ///
    /// Transaction workflows use this: a product deleted after the record
    /// was written has no stock left to move.
    pub async fn apply_delta_if_present(
        &self,
        product_id: &str,
        delta: Quantity,
        reason: AdjustReason,
    ) -> LedgerResult<Option<QuantityChange>> {
        let id = product_id.to_string();
        let Some(change) = self
            .store
            .modify::<Product, _, _>(product_id, move |product| {
                let previous = product.quantity;
                let current = floor_for(reason, previous.saturating_add(delta));
                product.quantity = current;
                product.updated_at = now_millis();
                Modification::Write(QuantityChange {
                    product_id: id,
                    previous,
                    current,
                    reason,
                })
            })
            .await?
        else {
            tracing::warn!(product_id, delta, reason = %reason, "Quantity delta skipped: product not found");
            return Ok(None);
        };

        if change.was_clamped(delta) {
            tracing::warn!(
                product_id,
                previous = change.previous,
                delta,
                reason = %reason,
                "Quantity clamped at zero"
            );
        }
        tracing::info!(
            product_id,
            previous = change.previous,
            current = change.current,
            reason = %reason,
            "Quantity delta applied"
        );
        Ok(Some(change))
    }
}
