//! Unified error system for the POS workspace
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error with code, message and details, as seen by the UI layer
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Sales errors
//! - 5xxx: After-sales errors
//! - 6xxx: Product / inventory errors
//! - 7xxx: Stock alert errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::InsufficientStock, "Only 2 in stock")
//!     .with_detail("available", 2);
//! assert_eq!(err.code.code(), 4002);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
