//! Data models
//!
//! Every persisted record kind of the POS. Cross-record links are an id plus
//! an embedded [`Product`] snapshot; no record holds a live reference.
//! JSON field names are camelCase, which is both the stored and the backup format.

pub mod category;
pub mod damaged_product;
pub mod delivery_receipt;
pub mod invoice;
pub mod product;
pub mod return_item;
pub mod stock_alert;
pub mod store_info;

// Re-exports
pub use category::*;
pub use damaged_product::*;
pub use delivery_receipt::*;
pub use invoice::*;
pub use product::*;
pub use return_item::*;
pub use stock_alert::*;
pub use store_info::*;
