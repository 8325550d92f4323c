//! Common types for the shared crate

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Stock quantity. Signed so that invalid input can be represented and rejected.
pub type Quantity = i32;
