//! Transaction workflows
//!
//! Checkout, return, damage report and delivery receipt. Each one validates
//! locally first, then writes its record, then (except delivery) moves stock
//! through the [`crate::inventory::InventoryLedger`]. The record write and the
//! stock move are separate transactions; see [`WorkflowError::PartiallyApplied`].

pub mod cart;
pub mod checkout;
pub mod damage;
pub mod delivery;
pub mod error;
pub mod phase;
pub mod returns;

pub use cart::{Cart, CartLine};
pub use checkout::{CheckoutDetails, CheckoutReceipt, CheckoutWorkflow};
pub use damage::{DamageReceipt, DamageRequest, DamageWorkflow};
pub use delivery::{DeliveryRequest, DeliveryWorkflow};
pub use error::{
    FailedAdjustment, ValidationError, WorkflowError, WorkflowOutcome, WorkflowResult,
};
pub use phase::WorkflowPhase;
pub use returns::{ReturnReceipt, ReturnRequest, ReturnWorkflow};
