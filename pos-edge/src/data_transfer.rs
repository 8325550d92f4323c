//! Backup export and import
//!
//! The backup is one JSON document holding store info, products, invoices
//! and categories. Import is a full replace done in a single write
//! transaction through [`PosStore::replace_all`], so a bad backup leaves the
//! current data untouched.

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, Invoice, Product, StoreInfo};
use thiserror::Error;

use crate::db::{PosStore, ReplaceSet, StoreError};

pub const BACKUP_VERSION: &str = "1.0.0";

/// Full backup document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// RFC 3339, UTC
    pub timestamp: String,
    pub store_info: StoreInfo,
    pub products: Vec<Product>,
    pub invoices: Vec<Invoice>,
    pub categories: Vec<Category>,
    pub version: String,
}

/// Counts written by an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub products: usize,
    pub invoices: usize,
    pub categories: usize,
    pub store_info_replaced: bool,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Backup is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Backup root must be an object")]
    NotAnObject,

    #[error("Invalid {section} entry at index {index}: {source}")]
    InvalidRecord {
        section: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode backup: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type TransferResult<T> = Result<T, TransferError>;

impl TransferError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) | Self::NotAnObject | Self::InvalidRecord { .. } => {
                ErrorCode::ImportFailed
            }
            Self::Encode(_) => ErrorCode::SerializationError,
            Self::Store(e) if e.is_unavailable() => e.error_code(),
            // Duplicates inside the backup abort the replace
            Self::Store(_) => ErrorCode::ImportFailed,
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        AppError::with_message(err.error_code(), err.to_string())
    }
}

/// Snapshot the whole store
pub async fn export(store: &PosStore) -> TransferResult<Backup> {
    let backup = Backup {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        store_info: store.store_info().await?,
        products: store.get_all().await?,
        invoices: store.get_all().await?,
        categories: store.get_all().await?,
        version: BACKUP_VERSION.to_string(),
    };
    tracing::info!(
        products = backup.products.len(),
        invoices = backup.invoices.len(),
        categories = backup.categories.len(),
        "Backup exported"
    );
    Ok(backup)
}

/// Export as pretty-printed JSON
pub async fn export_json(store: &PosStore) -> TransferResult<String> {
    let backup = export(store).await?;
    serde_json::to_string_pretty(&backup).map_err(TransferError::Encode)
}

/// Missing or non-array sections read as empty
fn section<T: DeserializeOwned>(
    root: &serde_json::Map<String, Value>,
    name: &'static str,
) -> TransferResult<Vec<T>> {
    let Some(Value::Array(entries)) = root.get(name) else {
        return Ok(Vec::new());
    };
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            T::deserialize(entry).map_err(|source| TransferError::InvalidRecord {
                section: name,
                index,
                source,
            })
        })
        .collect()
}

/// Parse a backup into the records it would write
pub fn parse_backup(json: &str) -> TransferResult<ReplaceSet> {
    let value: Value = serde_json::from_str(json).map_err(TransferError::Parse)?;
    let Value::Object(root) = value else {
        return Err(TransferError::NotAnObject);
    };

    let store_info = match root.get("storeInfo") {
        Some(info @ Value::Object(_)) => Some(StoreInfo::deserialize(info).map_err(|source| {
            TransferError::InvalidRecord {
                section: "storeInfo",
                index: 0,
                source,
            }
        })?),
        _ => None,
    };

    Ok(ReplaceSet {
        products: section(&root, "products")?,
        invoices: section(&root, "invoices")?,
        categories: section(&root, "categories")?,
        store_info,
    })
}

/// Replace the store contents with a backup
pub async fn import_json(store: &PosStore, json: &str) -> TransferResult<ImportSummary> {
    let set = parse_backup(json).inspect_err(|e| {
        tracing::warn!(error = %e, "Backup rejected");
    })?;
    let summary = ImportSummary {
        products: set.products.len(),
        invoices: set.invoices.len(),
        categories: set.categories.len(),
        store_info_replaced: set.store_info.is_some(),
    };
    store.replace_all(set).await?;
    crate::audit_log!(
        "import",
        "backup",
        format!(
            "{} products, {} invoices, {} categories, store info replaced: {}",
            summary.products, summary.invoices, summary.categories, summary.store_info_replaced
        )
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{InvoiceItem, PaymentMethod};

    fn product(id: &str, barcode: &str) -> Product {
        Product {
            id: id.into(),
            name: format!("منتج {}", id),
            barcode: barcode.into(),
            purchase_price: Decimal::new(1250, 2),
            sale_price: Decimal::new(2000, 2),
            quantity: 7,
            category: "كابلات".into(),
            description: None,
            image: None,
            created_at: 1,
            updated_at: 1,
        }
    }

    async fn seeded() -> PosStore {
        let store = PosStore::open_in_memory().unwrap();
        let p = product("p1", "111");
        store.add(&p).await.unwrap();
        store
            .add(&Category {
                id: "c1".into(),
                name: "كابلات".into(),
                description: None,
            })
            .await
            .unwrap();
        let invoice = Invoice::assemble(
            "i1".into(),
            vec![InvoiceItem::new(p, 2, Decimal::from(20)).unwrap()],
            Decimal::ZERO,
            PaymentMethod::Card,
            None,
            None,
            5,
        )
        .unwrap();
        store.add(&invoice).await.unwrap();
        store
            .set_store_info(&StoreInfo {
                name: "RedOne".into(),
                ..StoreInfo::default()
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_export_then_import_into_fresh_store() {
        let source = seeded().await;
        let json = export_json(&source).await.unwrap();
        assert!(json.contains("\"version\": \"1.0.0\""));
        assert!(json.contains("\"storeInfo\""));

        let target = PosStore::open_in_memory().unwrap();
        target.add(&product("old", "999")).await.unwrap();

        let summary = import_json(&target, &json).await.unwrap();
        assert_eq!(summary.products, 1);
        assert_eq!(summary.invoices, 1);
        assert_eq!(summary.categories, 1);
        assert!(summary.store_info_replaced);

        assert!(target.get::<Product>("old").await.unwrap().is_none());
        let p: Product = target.get_by_index("barcode", "111").await.unwrap().unwrap();
        assert_eq!(p.purchase_price, Decimal::new(1250, 2));
        let invoice: Invoice = target.require("i1").await.unwrap();
        assert_eq!(invoice.payment_method, PaymentMethod::Card);
        assert_eq!(target.store_info().await.unwrap().name, "RedOne");
    }

    #[tokio::test]
    async fn test_non_array_sections_import_as_empty() {
        let store = seeded().await;
        let summary = import_json(&store, r#"{"products": "nope", "version": "1.0.0"}"#)
            .await
            .unwrap();
        assert_eq!(summary.products, 0);
        assert!(!summary.store_info_replaced);
        assert_eq!(store.count::<Product>().await.unwrap(), 0);
        assert_eq!(store.count::<Invoice>().await.unwrap(), 0);
        // Store info untouched when absent
        assert_eq!(store.store_info().await.unwrap().name, "RedOne");
    }

    #[tokio::test]
    async fn test_bad_backup_leaves_store_untouched() {
        let store = seeded().await;

        let err = import_json(&store, "{not json").await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ImportFailed);

        let err = import_json(&store, "[1, 2]").await.unwrap_err();
        assert!(matches!(err, TransferError::NotAnObject));

        let err = import_json(&store, r#"{"products": [{"id": 3}]}"#)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::InvalidRecord { section: "products", index: 0, .. }
        ));

        assert_eq!(store.count::<Product>().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_barcodes_abort_import() {
        let store = seeded().await;
        let backup = serde_json::json!({
            "products": [product("a", "dup"), product("b", "dup")],
        });
        let err = import_json(&store, &backup.to_string()).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ImportFailed);
        assert!(store.get::<Product>("p1").await.unwrap().is_some());
    }
}
