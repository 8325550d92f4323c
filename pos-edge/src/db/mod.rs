//! redb-backed persistent store
//!
//! One embedded database file holds every collection of the POS. Each record
//! kind lives in its own table keyed by id, with a companion index table for
//! its secondary indexes (see [`record::Collection::indexes`]).
//!
//! # Durability
//!
//! Every write is a single redb write transaction: durable as soon as
//! `commit()` returns, and aborted (leaving nothing behind) when dropped on an
//! error path.
//!
//! # Lifecycle
//!
//! `open → ready → close`. After [`PosStore::close`] every operation fails with
//! [`StoreError::Closed`]. The handle is cheap to clone and shared process-wide.
//!
//! redb calls block, so every operation runs on tokio's blocking pool and is a
//! suspension point for the caller.

pub mod error;
pub mod record;
mod schema;

pub use error::{StoreError, StoreResult};
pub use record::{Collection, IndexDef, Record, timestamp_key};
pub use schema::SCHEMA_VERSION;

use parking_lot::RwLock;
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    WriteTransaction,
};
use shared::models::{Category, Invoice, Product, StoreInfo};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use schema::{WriteMode, index_ids, index_table, load, records_table};

/// Outcome of a [`PosStore::modify`] closure
#[derive(Debug)]
pub enum Modification<T> {
    /// Persist the modified record
    Write(T),
    /// Leave the stored record as it was
    Keep(T),
}

/// Records written by [`PosStore::replace_all`]
#[derive(Debug, Clone, Default)]
pub struct ReplaceSet {
    pub products: Vec<Product>,
    pub invoices: Vec<Invoice>,
    pub categories: Vec<Category>,
    pub store_info: Option<StoreInfo>,
}

/// Store handle backed by redb
#[derive(Clone)]
pub struct PosStore {
    db: Arc<RwLock<Option<Arc<Database>>>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for PosStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosStore")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl PosStore {
    /// Open or create the database at the given path
    ///
    /// Tables are created on first open and the schema version is recorded;
    /// reopening an existing file never touches its data.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        let version = schema::init_schema(&db)?;
        tracing::info!(path = %path.display(), schema_version = version, "Store opened");

        Ok(Self {
            db: Arc::new(RwLock::new(Some(Arc::new(db)))),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open `<work_dir>/database/<name>.redb`
    pub fn open_in_work_dir(work_dir: impl AsRef<Path>, name: &str) -> StoreResult<Self> {
        let path = work_dir
            .as_ref()
            .join("database")
            .join(format!("{}.redb", name));
        Self::open(path)
    }

    /// Open an in-memory database (for tests and demos)
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        schema::init_schema(&db)?;
        Ok(Self {
            db: Arc::new(RwLock::new(Some(Arc::new(db)))),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.db.read().is_some()
    }

    /// Close the store; later operations fail with [`StoreError::Closed`].
    ///
    /// The file is released once in-flight operations finish.
    pub fn close(&self) {
        if self.db.write().take().is_some() {
            tracing::info!(path = ?self.path, "Store closed");
        }
    }

    fn handle(&self) -> StoreResult<Arc<Database>> {
        self.db.read().clone().ok_or(StoreError::Closed)
    }

    // ========== Transaction runners ==========

    /// Run `f` in a read transaction on the blocking pool
    pub(crate) async fn read<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&ReadTransaction) -> StoreResult<T> + Send + 'static,
    {
        let db = self.handle()?;
        tokio::task::spawn_blocking(move || {
            let read_txn = db.begin_read()?;
            f(&read_txn)
        })
        .await?
    }

    /// Run `f` in a write transaction on the blocking pool, committing on `Ok`
    pub(crate) async fn write<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&WriteTransaction) -> StoreResult<T> + Send + 'static,
    {
        let db = self.handle()?;
        tokio::task::spawn_blocking(move || {
            let write_txn = db.begin_write()?;
            let value = f(&write_txn)?;
            write_txn.commit()?;
            Ok(value)
        })
        .await?
    }

    // ========== Record Operations ==========

    /// Strict insert: fails with `DuplicateKey` when the id exists or a unique
    /// index value belongs to another record.
    pub async fn add<R: Record>(&self, record: &R) -> StoreResult<()> {
        let record = record.clone();
        self.write(move |txn| schema::write_record(txn, &record, WriteMode::Insert))
            .await?;
        tracing::debug!(collection = %R::COLLECTION, "Record added");
        Ok(())
    }

    /// Upsert by id; unique indexes are still enforced against other ids.
    pub async fn put<R: Record>(&self, record: &R) -> StoreResult<()> {
        let record = record.clone();
        self.write(move |txn| schema::write_record(txn, &record, WriteMode::Upsert))
            .await
    }

    /// Fetch by id; absence is `None`, not an error.
    pub async fn get<R: Record>(&self, id: &str) -> StoreResult<Option<R>> {
        let id = id.to_string();
        self.read(move |txn| {
            let table = txn.open_table(records_table(R::COLLECTION))?;
            load(&table, &id)
        })
        .await
    }

    /// Fetch by id, treating absence as [`StoreError::NotFound`]
    pub async fn require<R: Record>(&self, id: &str) -> StoreResult<R> {
        self.get(id).await?.ok_or_else(|| StoreError::NotFound {
            collection: R::COLLECTION,
            id: id.to_string(),
        })
    }

    /// First record holding `value` in the named index
    pub async fn get_by_index<R: Record>(&self, index: &str, value: &str) -> StoreResult<Option<R>> {
        Ok(self.list_by_index(index, value).await?.into_iter().next())
    }

    /// Every record holding `value` in the named index
    pub async fn list_by_index<R: Record>(&self, index: &str, value: &str) -> StoreResult<Vec<R>> {
        let def = R::COLLECTION
            .index_def(index)
            .ok_or_else(|| StoreError::UnknownIndex {
                collection: R::COLLECTION,
                index: index.to_string(),
            })?;
        let value = value.to_string();
        self.read(move |txn| {
            let index = txn.open_table(index_table(R::COLLECTION))?;
            let records = txn.open_table(records_table(R::COLLECTION))?;
            let mut found = Vec::new();
            for id in index_ids(&index, def.name, &value)? {
                if let Some(record) = load(&records, &id)? {
                    found.push(record);
                }
            }
            Ok(found)
        })
        .await
    }

    /// Unordered snapshot of a whole collection
    pub async fn get_all<R: Record>(&self) -> StoreResult<Vec<R>> {
        self.read(|txn| {
            let table = txn.open_table(records_table(R::COLLECTION))?;
            let mut records = Vec::new();
            for entry in table.iter()? {
                let (_key, value) = entry?;
                records.push(serde_json::from_slice(value.value())?);
            }
            Ok(records)
        })
        .await
    }

    pub async fn count<R: Record>(&self) -> StoreResult<u64> {
        self.read(|txn| {
            let table = txn.open_table(records_table(R::COLLECTION))?;
            Ok(table.len()?)
        })
        .await
    }

    /// Delete by id; returns whether a record was removed.
    pub async fn delete<R: Record>(&self, id: &str) -> StoreResult<bool> {
        let id = id.to_string();
        let removed = self
            .write(move |txn| schema::remove_record::<R>(txn, &id))
            .await?;
        tracing::debug!(collection = %R::COLLECTION, removed, "Record delete");
        Ok(removed)
    }

    /// Read-modify-write of one record inside a single write transaction.
    ///
    /// Returns `None` when the record does not exist. The closure sees the
    /// committed state and no other writer can interleave with it.
    pub async fn modify<R, T, F>(&self, id: &str, f: F) -> StoreResult<Option<T>>
    where
        R: Record,
        T: Send + 'static,
        F: FnOnce(&mut R) -> Modification<T> + Send + 'static,
    {
        let id = id.to_string();
        self.write(move |txn| {
            let current: Option<R> = {
                let table = txn.open_table(records_table(R::COLLECTION))?;
                load(&table, &id)?
            };
            let Some(mut record) = current else {
                return Ok(None);
            };
            match f(&mut record) {
                Modification::Write(value) => {
                    schema::write_record(txn, &record, WriteMode::Upsert)?;
                    Ok(Some(value))
                }
                Modification::Keep(value) => Ok(Some(value)),
            }
        })
        .await
    }

    /// Clear every collection and write the given records, all in one transaction.
    ///
    /// Any failure (for example two products sharing a barcode) aborts the
    /// transaction and leaves the previous contents in place.
    pub async fn replace_all(&self, set: ReplaceSet) -> StoreResult<()> {
        let (products, invoices, categories) =
            (set.products.len(), set.invoices.len(), set.categories.len());
        self.write(move |txn| {
            schema::clear_collections(txn)?;
            for product in &set.products {
                schema::write_record(txn, product, WriteMode::Insert)?;
            }
            for invoice in &set.invoices {
                schema::write_record(txn, invoice, WriteMode::Insert)?;
            }
            for category in &set.categories {
                schema::write_record(txn, category, WriteMode::Insert)?;
            }
            if let Some(info) = &set.store_info {
                schema::write_store_info(txn, info)?;
            }
            Ok(())
        })
        .await?;
        tracing::info!(products, invoices, categories, "Store contents replaced");
        Ok(())
    }

    // ========== Meta ==========

    /// Store settings, falling back to defaults when never saved
    pub async fn store_info(&self) -> StoreResult<StoreInfo> {
        self.read(|txn| {
            let meta = txn.open_table(schema::META_TABLE)?;
            Ok(schema::read_store_info(&meta)?.unwrap_or_default())
        })
        .await
    }

    pub async fn set_store_info(&self, info: &StoreInfo) -> StoreResult<()> {
        let info = info.clone();
        self.write(move |txn| schema::write_store_info(txn, &info))
            .await
    }

    pub async fn schema_version(&self) -> StoreResult<Option<u32>> {
        self.read(|txn| {
            let meta = txn.open_table(schema::META_TABLE)?;
            schema::read_schema_version(&meta)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{AlertType, StockAlert};

    fn product(id: &str, barcode: &str, quantity: i32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: barcode.to_string(),
            purchase_price: Decimal::new(500, 2),
            sale_price: Decimal::new(1000, 2),
            quantity,
            category: "كابلات".to_string(),
            description: None,
            image: None,
            created_at: 1_000,
            updated_at: 1_000,
        }
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let store = PosStore::open_in_memory().unwrap();
        let p = product("p1", "111", 5);
        store.add(&p).await.unwrap();

        let loaded: Product = store.get("p1").await.unwrap().unwrap();
        assert_eq!(loaded, p);
        assert!(store.get::<Product>("missing").await.unwrap().is_none());
        assert_eq!(store.count::<Product>().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_existing_id() {
        let store = PosStore::open_in_memory().unwrap();
        store.add(&product("p1", "111", 5)).await.unwrap();
        let err = store.add(&product("p1", "222", 5)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { field: "id", .. }));
    }

    #[tokio::test]
    async fn test_unique_barcode_enforced_on_add_and_put() {
        let store = PosStore::open_in_memory().unwrap();
        store.add(&product("p1", "111", 5)).await.unwrap();

        let err = store.add(&product("p2", "111", 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { field: "barcode", .. }));

        store.add(&product("p2", "222", 1)).await.unwrap();
        let err = store.put(&product("p2", "111", 1)).await.unwrap_err();
        assert!(err.is_duplicate());

        // Failed write left nothing behind
        let p2: Product = store.require("p2").await.unwrap();
        assert_eq!(p2.barcode, "222");
    }

    #[tokio::test]
    async fn test_put_moves_index_entries() {
        let store = PosStore::open_in_memory().unwrap();
        store.add(&product("p1", "111", 5)).await.unwrap();
        store.put(&product("p1", "999", 5)).await.unwrap();

        assert!(
            store
                .get_by_index::<Product>("barcode", "111")
                .await
                .unwrap()
                .is_none()
        );
        let found: Product = store
            .get_by_index("barcode", "999")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "p1");

        // Old barcode is free again
        store.add(&product("p2", "111", 1)).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_by_index_returns_all_matches() {
        let store = PosStore::open_in_memory().unwrap();
        store.add(&product("p1", "111", 5)).await.unwrap();
        store.add(&product("p2", "222", 5)).await.unwrap();
        let mut other = product("p3", "333", 5);
        other.category = "سماعات".into();
        store.add(&other).await.unwrap();

        let cables: Vec<Product> = store.list_by_index("category", "كابلات").await.unwrap();
        assert_eq!(cables.len(), 2);

        let err = store
            .list_by_index::<Product>("color", "red")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownIndex { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_noop_when_absent() {
        let store = PosStore::open_in_memory().unwrap();
        store.add(&product("p1", "111", 5)).await.unwrap();

        assert!(store.delete::<Product>("p1").await.unwrap());
        assert!(!store.delete::<Product>("p1").await.unwrap());
        assert!(
            store
                .get_by_index::<Product>("barcode", "111")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_modify_writes_or_keeps() {
        let store = PosStore::open_in_memory().unwrap();
        store.add(&product("p1", "111", 5)).await.unwrap();

        let out = store
            .modify::<Product, _, _>("p1", |p| {
                p.quantity = 9;
                Modification::Write(p.quantity)
            })
            .await
            .unwrap();
        assert_eq!(out, Some(9));

        let out = store
            .modify::<Product, _, _>("p1", |p| {
                p.quantity = 0;
                Modification::Keep(())
            })
            .await
            .unwrap();
        assert_eq!(out, Some(()));
        assert_eq!(store.require::<Product>("p1").await.unwrap().quantity, 9);

        let missing = store
            .modify::<Product, _, _>("nope", |_| Modification::Write(()))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_boolean_index() {
        let store = PosStore::open_in_memory().unwrap();
        let alert = StockAlert {
            id: "a1".into(),
            product_id: "p1".into(),
            product: product("p1", "111", 2),
            alert_type: AlertType::LowStock,
            threshold: 5,
            current_quantity: 2,
            created_at: 1,
            acknowledged: false,
        };
        store.add(&alert).await.unwrap();

        let open: Vec<StockAlert> = store.list_by_index("acknowledged", "false").await.unwrap();
        assert_eq!(open.len(), 1);

        let mut acked = alert.clone();
        acked.acknowledged = true;
        store.put(&acked).await.unwrap();
        let open: Vec<StockAlert> = store.list_by_index("acknowledged", "false").await.unwrap();
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let store = PosStore::open_in_memory().unwrap();
        let clone = store.clone();
        store.close();

        assert!(!clone.is_open());
        let err = clone.get::<Product>("p1").await.unwrap_err();
        assert!(err.is_unavailable());
        let err = clone.add(&product("p1", "1", 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Closed));
    }

    #[tokio::test]
    async fn test_replace_all_is_atomic() {
        let store = PosStore::open_in_memory().unwrap();
        store.add(&product("old", "000", 1)).await.unwrap();

        // Two products sharing a barcode: whole import aborts
        let bad = ReplaceSet {
            products: vec![product("a", "1", 1), product("b", "1", 1)],
            ..Default::default()
        };
        assert!(store.replace_all(bad).await.is_err());
        assert!(store.get::<Product>("old").await.unwrap().is_some());

        let good = ReplaceSet {
            products: vec![product("a", "1", 1)],
            ..Default::default()
        };
        store.replace_all(good).await.unwrap();
        assert!(store.get::<Product>("old").await.unwrap().is_none());
        assert_eq!(store.count::<Product>().await.unwrap(), 1);
        assert!(
            store
                .get_by_index::<Product>("barcode", "000")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_store_info_defaults_then_persists() {
        let store = PosStore::open_in_memory().unwrap();
        assert_eq!(store.store_info().await.unwrap(), StoreInfo::default());

        let mut info = StoreInfo::default();
        info.phone = "0550000000".into();
        store.set_store_info(&info).await.unwrap();
        assert_eq!(store.store_info().await.unwrap().phone, "0550000000");
        assert_eq!(store.schema_version().await.unwrap(), Some(SCHEMA_VERSION));
    }
}
