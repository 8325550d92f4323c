//! Shared types for the RedOne POS workspace
//!
//! Record models, error codes and small utilities used by `pos-edge`
//! and by any UI layer that consumes its query/command API.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use types::{Quantity, Timestamp};
