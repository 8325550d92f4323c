//! Store errors

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use super::record::Collection;

/// Storage errors
///
/// Engine failures (open, transaction, table, storage, commit), a closed store
/// and a failed blocking task all mean the store cannot serve the request;
/// [`StoreError::is_unavailable`] groups them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate key in {collection}: {field}={value}")]
    DuplicateKey {
        collection: Collection,
        field: &'static str,
        value: String,
    },

    #[error("Record not found in {collection}: {id}")]
    NotFound { collection: Collection, id: String },

    #[error("Unknown index {index} on {collection}")]
    UnknownIndex {
        collection: Collection,
        index: String,
    },

    #[error("Unsupported schema version {found} (this build supports up to {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("Store is closed")]
    Closed,

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Whether the store itself failed (as opposed to the request)
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::Database(_)
                | StoreError::Transaction(_)
                | StoreError::Table(_)
                | StoreError::Storage(_)
                | StoreError::Commit(_)
                | StoreError::UnsupportedSchema { .. }
                | StoreError::Closed
                | StoreError::Join(_)
                | StoreError::Io(_)
        )
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    /// Map to the shared error code seen by the UI
    pub fn error_code(&self) -> ErrorCode {
        match self {
            StoreError::DuplicateKey {
                collection: Collection::Products,
                field: "barcode",
                ..
            } => ErrorCode::BarcodeAlreadyExists,
            StoreError::DuplicateKey {
                collection: Collection::Categories,
                ..
            } => ErrorCode::CategoryAlreadyExists,
            StoreError::DuplicateKey { .. } => ErrorCode::AlreadyExists,
            StoreError::NotFound { collection, .. } => match collection {
                Collection::Products => ErrorCode::ProductNotFound,
                Collection::Categories => ErrorCode::CategoryNotFound,
                Collection::Invoices => ErrorCode::InvoiceNotFound,
                Collection::DeliveryReceipts => ErrorCode::DeliveryReceiptNotFound,
                Collection::StockAlerts => ErrorCode::AlertNotFound,
                _ => ErrorCode::NotFound,
            },
            StoreError::UnknownIndex { .. } => ErrorCode::InvalidRequest,
            StoreError::Serialization(_) => ErrorCode::SerializationError,
            _ => ErrorCode::StoreUnavailable,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let code = err.error_code();
        let app = AppError::with_message(code, err.to_string());
        match err {
            StoreError::DuplicateKey { field, value, .. } => {
                app.with_detail("field", field).with_detail("value", value)
            }
            StoreError::NotFound { id, .. } => app.with_detail("id", id),
            _ => app,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_barcode_maps_to_barcode_code() {
        let err = StoreError::DuplicateKey {
            collection: Collection::Products,
            field: "barcode",
            value: "123".into(),
        };
        assert!(err.is_duplicate());
        assert!(!err.is_unavailable());
        assert_eq!(err.error_code(), ErrorCode::BarcodeAlreadyExists);
    }

    #[test]
    fn test_closed_is_unavailable() {
        let err = StoreError::Closed;
        assert!(err.is_unavailable());
        assert_eq!(err.error_code(), ErrorCode::StoreUnavailable);
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::StoreUnavailable);
    }

    #[test]
    fn test_not_found_maps_per_collection() {
        let err = StoreError::NotFound {
            collection: Collection::Invoices,
            id: "inv-1".into(),
        };
        assert_eq!(err.error_code(), ErrorCode::InvoiceNotFound);
        let app: AppError = err.into();
        assert_eq!(app.details.unwrap()["id"], "inv-1");
    }
}
