//! Workflow errors and outcomes
//!
//! Every failed workflow ends in exactly one of three outcomes, so the caller
//! can tell them apart:
//!
//! | Outcome | Wrote anything? |
//! |---------|-----------------|
//! | [`WorkflowOutcome::ValidationRejected`] | no, storage was not written |
//! | [`WorkflowOutcome::CommitFailed`] | no, the record write failed or never started |
//! | [`WorkflowOutcome::PartiallyApplied`] | yes, the record exists but some stock moves failed |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::types::Quantity;
use thiserror::Error;

use super::phase::WorkflowPhase;
use crate::db::StoreError;
use crate::inventory::LedgerError;

/// Final result class of a workflow submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOutcome {
    Committed,
    ValidationRejected,
    CommitFailed,
    PartiallyApplied,
}

/// Input rejected before anything was written
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Cart is empty")]
    CartEmpty,

    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(Quantity),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product {0} is out of stock")]
    ProductOutOfStock(String),

    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    InsufficientStock {
        product_id: String,
        requested: Quantity,
        available: Quantity,
    },

    #[error("Discount {discount} must be between 0 and the subtotal {subtotal}")]
    InvalidDiscount { discount: Decimal, subtotal: Decimal },

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    #[error("Invoice {invoice_id} has no line for product {product_id}")]
    InvoiceLineNotFound {
        invoice_id: String,
        product_id: String,
    },

    #[error("Return of {requested} exceeds the {purchased} purchased")]
    ReturnQuantityExceeded {
        requested: Quantity,
        purchased: Quantity,
    },

    #[error("Refund amount {0} is negative")]
    InvalidRefundAmount(Decimal),

    #[error("Damaged quantity {requested} exceeds the {available} in stock")]
    DamageQuantityExceeded {
        requested: Quantity,
        available: Quantity,
    },

    #[error("Field '{0}' is required")]
    RequiredField(&'static str),

    #[error("Amount is too large to compute exactly")]
    AmountOutOfRange,
}

impl ValidationError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ValidationError::CartEmpty => ErrorCode::CartEmpty,
            ValidationError::InvalidQuantity(_) => ErrorCode::InvalidQuantity,
            ValidationError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            ValidationError::ProductOutOfStock(_) => ErrorCode::ProductOutOfStock,
            ValidationError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            ValidationError::InvalidDiscount { .. } => ErrorCode::InvalidDiscount,
            ValidationError::InvoiceNotFound(_) => ErrorCode::InvoiceNotFound,
            ValidationError::InvoiceLineNotFound { .. } => ErrorCode::InvoiceLineNotFound,
            ValidationError::ReturnQuantityExceeded { .. } => ErrorCode::ReturnQuantityExceeded,
            ValidationError::InvalidRefundAmount(_) => ErrorCode::InvalidRefundAmount,
            ValidationError::DamageQuantityExceeded { .. } => ErrorCode::DamageQuantityExceeded,
            ValidationError::RequiredField(_) => ErrorCode::RequiredField,
            ValidationError::AmountOutOfRange => ErrorCode::ValueOutOfRange,
        }
    }
}

/// A stock movement that did not happen after the record was written
#[derive(Debug)]
pub struct FailedAdjustment {
    pub product_id: String,
    pub delta: Quantity,
    pub error: LedgerError,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Rejected while {phase}: {reason}")]
    Rejected {
        phase: WorkflowPhase,
        reason: ValidationError,
    },

    /// The store failed; nothing was written by this submission
    #[error("Store failure while {phase}: {source}")]
    CommitFailed {
        phase: WorkflowPhase,
        #[source]
        source: StoreError,
    },

    /// Record `record_id` was written but these stock moves failed
    #[error("{record_id} recorded but {} stock adjustment(s) failed", .failed.len())]
    PartiallyApplied {
        record_id: String,
        failed: Vec<FailedAdjustment>,
    },
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

impl WorkflowError {
    pub(crate) fn rejected(phase: WorkflowPhase, reason: ValidationError) -> Self {
        WorkflowError::Rejected { phase, reason }
    }

    pub(crate) fn store(phase: WorkflowPhase) -> impl FnOnce(StoreError) -> Self {
        move |source| WorkflowError::CommitFailed { phase, source }
    }

    /// Phase the workflow was in when it stopped
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowError::Rejected { phase, .. } | WorkflowError::CommitFailed { phase, .. } => {
                *phase
            }
            WorkflowError::PartiallyApplied { .. } => WorkflowPhase::Submitting,
        }
    }

    pub fn outcome(&self) -> WorkflowOutcome {
        match self {
            WorkflowError::Rejected { .. } => WorkflowOutcome::ValidationRejected,
            WorkflowError::CommitFailed { .. } => WorkflowOutcome::CommitFailed,
            WorkflowError::PartiallyApplied { .. } => WorkflowOutcome::PartiallyApplied,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            WorkflowError::Rejected { reason, .. } => reason.error_code(),
            WorkflowError::CommitFailed { source, .. } => source.error_code(),
            WorkflowError::PartiallyApplied { .. } => ErrorCode::PartiallyApplied,
        }
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            WorkflowError::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let app = AppError::with_message(err.error_code(), err.to_string())
            .with_detail("phase", err.phase().as_str())
            .with_detail("outcome", serde_json::json!(err.outcome()));
        match err {
            WorkflowError::Rejected {
                reason:
                    ValidationError::InsufficientStock {
                        product_id,
                        available,
                        ..
                    },
                ..
            } => app
                .with_detail("productId", product_id)
                .with_detail("available", available),
            WorkflowError::PartiallyApplied { record_id, failed } => {
                let products: Vec<String> = failed.into_iter().map(|f| f.product_id).collect();
                app.with_detail("recordId", record_id)
                    .with_detail("failedProducts", products)
            }
            _ => app,
        }
    }
}
