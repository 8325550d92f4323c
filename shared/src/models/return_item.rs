//! Return Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;
use crate::types::{Quantity, Timestamp};

/// 退货审核状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "pending",
            ReturnStatus::Approved => "approved",
            ReturnStatus::Rejected => "rejected",
        }
    }
}

/// Customer return against one invoice line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub id: String,
    pub original_invoice_id: String,
    pub product_id: String,
    /// Snapshot taken from the invoice line, not from the live catalog
    pub product: Product,
    pub quantity: Quantity,
    pub reason: String,
    pub return_date: Timestamp,
    pub refund_amount: Decimal,
    pub status: ReturnStatus,
}
