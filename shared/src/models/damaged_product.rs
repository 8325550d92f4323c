//! Damaged Product Model

use serde::{Deserialize, Serialize};

use super::Product;
use crate::types::{Quantity, Timestamp};

/// 损坏报告审核状态
///
/// Only `Pending` is ever written by the damage workflow; the other values
/// are reachable through a direct record edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DamageStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl DamageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DamageStatus::Pending => "pending",
            DamageStatus::Approved => "approved",
            DamageStatus::Rejected => "rejected",
        }
    }
}

/// Damaged stock report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamagedProduct {
    pub id: String,
    pub product_id: String,
    pub product: Product,
    pub quantity: Quantity,
    pub reason: String,
    pub reported_by: String,
    pub reported_at: Timestamp,
    pub status: DamageStatus,
}
