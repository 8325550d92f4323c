//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Quantity, Timestamp};

/// Product entity
///
/// `quantity` is only changed by the inventory ledger (or a full catalog edit).
/// Invoices, returns, damage reports and alerts embed a clone of this struct
/// taken at creation time; later edits never reach those copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unique across all products
    pub barcode: String,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub quantity: Quantity,
    /// Category name (denormalized, not enforced)
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image as data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub barcode: String,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub quantity: Quantity,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Full-record product edit (the catalog form always submits every field)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    pub barcode: String,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub quantity: Quantity,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}
