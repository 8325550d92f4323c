//! Stock Alert Model

use serde::{Deserialize, Serialize};

use super::Product;
use crate::types::{Quantity, Timestamp};

/// 库存告警类型
///
/// `ExpiryWarning` is part of the persisted vocabulary but no scan produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowStock,
    OutOfStock,
    ExpiryWarning,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::LowStock => "low_stock",
            AlertType::OutOfStock => "out_of_stock",
            AlertType::ExpiryWarning => "expiry_warning",
        }
    }
}

/// Stock alert raised by a scan; only `acknowledged` ever changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub id: String,
    pub product_id: String,
    pub product: Product,
    pub alert_type: AlertType,
    pub threshold: Quantity,
    pub current_quantity: Quantity,
    pub created_at: Timestamp,
    pub acknowledged: bool,
}
