//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 4xxx: Sales errors
/// - 5xxx: After-sales errors
/// - 6xxx: Inventory errors
/// - 7xxx: Alert errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Sales errors (4xxx)
    Sales,
    /// After-sales errors (5xxx)
    AfterSales,
    /// Inventory errors (6xxx)
    Inventory,
    /// Alert errors (7xxx)
    Alert,
    /// System errors (9xxx and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Sales,
            5000..6000 => Self::AfterSales,
            6000..7000 => Self::Inventory,
            7000..8000 => Self::Alert,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Sales => "sales",
            Self::AfterSales => "after_sales",
            Self::Inventory => "inventory",
            Self::Alert => "alert",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Sales);
        assert_eq!(ErrorCategory::from_code(5003), ErrorCategory::AfterSales);
        assert_eq!(ErrorCategory::from_code(6002), ErrorCategory::Inventory);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Alert);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(2500), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::CartEmpty.category(), ErrorCategory::Sales);
        assert_eq!(
            ErrorCode::DamageQuantityExceeded.category(),
            ErrorCategory::AfterSales
        );
        assert_eq!(
            ErrorCode::BarcodeAlreadyExists.category(),
            ErrorCategory::Inventory
        );
        assert_eq!(ErrorCode::StoreUnavailable.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_name() {
        assert_eq!(ErrorCategory::AfterSales.name(), "after_sales");
        assert_eq!(ErrorCategory::Inventory.name(), "inventory");
    }
}
