//! Inventory
//!
//! [`InventoryLedger`] is the only path that changes `Product.quantity`
//! outside full-record catalog edits.

pub mod ledger;

pub use ledger::{AdjustReason, CasOutcome, InventoryLedger, LedgerError, QuantityChange};
