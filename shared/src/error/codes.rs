//! Unified error codes for the POS workspace
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Sales errors (cart, checkout, invoices)
//! - 5xxx: After-sales errors (returns, damage reports, delivery receipts)
//! - 6xxx: Product and inventory errors
//! - 7xxx: Stock alert errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and for the UI layer to localize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Sales ====================
    /// Cart has no lines
    CartEmpty = 4001,
    /// Requested quantity exceeds available stock
    InsufficientStock = 4002,
    /// Product has no stock at all
    ProductOutOfStock = 4003,
    /// Discount is negative or larger than the subtotal
    InvalidDiscount = 4004,
    /// Invoice not found
    InvoiceNotFound = 4005,
    /// Invoice has no line for the product
    InvoiceLineNotFound = 4006,

    // ==================== 5xxx: After-sales ====================
    /// Return quantity exceeds the purchased quantity
    ReturnQuantityExceeded = 5001,
    /// Refund amount is negative
    InvalidRefundAmount = 5002,
    /// Damaged quantity exceeds current stock
    DamageQuantityExceeded = 5003,
    /// Delivery receipt not found
    DeliveryReceiptNotFound = 5004,

    // ==================== 6xxx: Product / Inventory ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Barcode already used by another product
    BarcodeAlreadyExists = 6002,
    /// Category not found
    CategoryNotFound = 6003,
    /// Category name already exists
    CategoryAlreadyExists = 6004,
    /// Quantity must be a positive integer
    InvalidQuantity = 6005,
    /// Price must be non-negative
    InvalidPrice = 6006,
    /// Quantity changed since it was read
    QuantityConflict = 6007,

    // ==================== 7xxx: Stock alerts ====================
    /// Stock alert not found
    AlertNotFound = 7001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Store not open or engine unavailable
    StoreUnavailable = 9003,
    /// Record could not be encoded or decoded
    SerializationError = 9004,
    /// Backup document could not be imported
    ImportFailed = 9005,
    /// A workflow recorded its document but not every stock adjustment
    PartiallyApplied = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Sales
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::InsufficientStock => "Requested quantity exceeds available stock",
            ErrorCode::ProductOutOfStock => "Product is out of stock",
            ErrorCode::InvalidDiscount => "Discount is invalid",
            ErrorCode::InvoiceNotFound => "Invoice not found",
            ErrorCode::InvoiceLineNotFound => "Invoice has no line for this product",

            // After-sales
            ErrorCode::ReturnQuantityExceeded => "Return quantity exceeds purchased quantity",
            ErrorCode::InvalidRefundAmount => "Refund amount is invalid",
            ErrorCode::DamageQuantityExceeded => "Damaged quantity exceeds available stock",
            ErrorCode::DeliveryReceiptNotFound => "Delivery receipt not found",

            // Product / Inventory
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::BarcodeAlreadyExists => "Barcode is already used by another product",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryAlreadyExists => "Category already exists",
            ErrorCode::InvalidQuantity => "Quantity is invalid",
            ErrorCode::InvalidPrice => "Price is invalid",
            ErrorCode::QuantityConflict => "Quantity was changed concurrently",

            // Alerts
            ErrorCode::AlertNotFound => "Stock alert not found",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::StoreUnavailable => "Store is unavailable",
            ErrorCode::SerializationError => "Record serialization failed",
            ErrorCode::ImportFailed => "Backup import failed",
            ErrorCode::PartiallyApplied => "Operation was only partially applied",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Sales
            4001 => Ok(ErrorCode::CartEmpty),
            4002 => Ok(ErrorCode::InsufficientStock),
            4003 => Ok(ErrorCode::ProductOutOfStock),
            4004 => Ok(ErrorCode::InvalidDiscount),
            4005 => Ok(ErrorCode::InvoiceNotFound),
            4006 => Ok(ErrorCode::InvoiceLineNotFound),

            // After-sales
            5001 => Ok(ErrorCode::ReturnQuantityExceeded),
            5002 => Ok(ErrorCode::InvalidRefundAmount),
            5003 => Ok(ErrorCode::DamageQuantityExceeded),
            5004 => Ok(ErrorCode::DeliveryReceiptNotFound),

            // Product / Inventory
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::BarcodeAlreadyExists),
            6003 => Ok(ErrorCode::CategoryNotFound),
            6004 => Ok(ErrorCode::CategoryAlreadyExists),
            6005 => Ok(ErrorCode::InvalidQuantity),
            6006 => Ok(ErrorCode::InvalidPrice),
            6007 => Ok(ErrorCode::QuantityConflict),

            // Alerts
            7001 => Ok(ErrorCode::AlertNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::StoreUnavailable),
            9004 => Ok(ErrorCode::SerializationError),
            9005 => Ok(ErrorCode::ImportFailed),
            9006 => Ok(ErrorCode::PartiallyApplied),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
