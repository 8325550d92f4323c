//! Table layout and transaction-level record operations
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `<collection>` | `id` | JSON record | Primary records |
//! | `<collection>_idx` | `(index, value, id)` | `()` | Secondary index entries |
//! | `meta` | `&str` | JSON | Schema version, store info |
//!
//! Everything here runs inside a caller-owned transaction; committing (or
//! dropping, which aborts) is the caller's job.

use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::StoreInfo;

use super::error::{StoreError, StoreResult};
use super::record::{Collection, Record};

/// Current on-disk layout version
pub const SCHEMA_VERSION: u32 = 1;

/// Table for store metadata: key = setting name, value = JSON
pub(crate) const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";
const STORE_INFO_KEY: &str = "store_info";

/// Index entry key: (index name, indexed value, record id)
pub(crate) type IndexKey = (&'static str, &'static str, &'static str);

pub(crate) fn records_table(
    collection: Collection,
) -> TableDefinition<'static, &'static str, &'static [u8]> {
    TableDefinition::new(collection.name())
}

pub(crate) fn index_table(collection: Collection) -> TableDefinition<'static, IndexKey, ()> {
    TableDefinition::new(collection.index_table_name())
}

/// Whether a plain insert or an upsert is being performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    Insert,
    Upsert,
}

/// Create every table and record the schema version.
///
/// Idempotent: existing tables and data are left untouched.
pub(crate) fn init_schema(db: &Database) -> StoreResult<u32> {
    let write_txn = db.begin_write()?;
    let version = {
        for collection in Collection::ALL {
            let _ = write_txn.open_table(records_table(collection))?;
            let _ = write_txn.open_table(index_table(collection))?;
        }

        let mut meta = write_txn.open_table(META_TABLE)?;
        let stored: Option<u32> = match meta.get(SCHEMA_VERSION_KEY)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        match stored {
            Some(found) if found > SCHEMA_VERSION => {
                return Err(StoreError::UnsupportedSchema {
                    found,
                    supported: SCHEMA_VERSION,
                });
            }
            Some(found) => found,
            None => {
                let bytes = serde_json::to_vec(&SCHEMA_VERSION)?;
                meta.insert(SCHEMA_VERSION_KEY, bytes.as_slice())?;
                SCHEMA_VERSION
            }
        }
    };
    write_txn.commit()?;
    Ok(version)
}

/// Ids holding `value` in index `name`
pub(crate) fn index_ids<T>(table: &T, name: &str, value: &str) -> StoreResult<Vec<String>>
where
    T: ReadableTable<IndexKey, ()>,
{
    let mut ids = Vec::new();
    for entry in table.range((name, value, "")..)? {
        let (key, _) = entry?;
        let (entry_name, entry_value, id) = key.value();
        if entry_name != name || entry_value != value {
            break;
        }
        ids.push(id.to_string());
    }
    Ok(ids)
}

/// Load one record by id
pub(crate) fn load<R, T>(table: &T, id: &str) -> StoreResult<Option<R>>
where
    R: Record,
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

/// Insert or replace a record, maintaining its index entries.
///
/// Unique indexes are checked against every other id; a violation aborts
/// before anything is written.
pub(crate) fn write_record<R: Record>(
    txn: &WriteTransaction,
    record: &R,
    mode: WriteMode,
) -> StoreResult<()> {
    let collection = R::COLLECTION;
    let mut records = txn.open_table(records_table(collection))?;
    let mut index = txn.open_table(index_table(collection))?;
    let id = record.id();

    let previous: Option<R> = load(&records, id)?;
    if previous.is_some() && mode == WriteMode::Insert {
        return Err(StoreError::DuplicateKey {
            collection,
            field: "id",
            value: id.to_string(),
        });
    }

    let values = record.index_values();
    for def in collection.indexes().iter().filter(|def| def.unique) {
        let Some((_, value)) = values.iter().find(|(name, _)| *name == def.name) else {
            continue;
        };
        let holders = index_ids(&index, def.name, value)?;
        if holders.iter().any(|holder| holder != id) {
            return Err(StoreError::DuplicateKey {
                collection,
                field: def.name,
                value: value.clone(),
            });
        }
    }

    if let Some(previous) = previous {
        for (name, value) in previous.index_values() {
            index.remove((name, value.as_str(), id))?;
        }
    }

    let bytes = serde_json::to_vec(record)?;
    records.insert(id, bytes.as_slice())?;
    for (name, value) in &values {
        index.insert((*name, value.as_str(), id), ())?;
    }
    Ok(())
}

/// Remove a record and its index entries; `false` when it was absent.
pub(crate) fn remove_record<R: Record>(txn: &WriteTransaction, id: &str) -> StoreResult<bool> {
    let collection = R::COLLECTION;
    let mut records = txn.open_table(records_table(collection))?;
    let mut index = txn.open_table(index_table(collection))?;

    let Some(previous) = load::<R, _>(&records, id)? else {
        return Ok(false);
    };
    for (name, value) in previous.index_values() {
        index.remove((name, value.as_str(), id))?;
    }
    records.remove(id)?;
    Ok(true)
}

/// Drop and recreate every collection table (import path)
pub(crate) fn clear_collections(txn: &WriteTransaction) -> StoreResult<()> {
    for collection in Collection::ALL {
        txn.delete_table(records_table(collection))?;
        txn.delete_table(index_table(collection))?;
        let _ = txn.open_table(records_table(collection))?;
        let _ = txn.open_table(index_table(collection))?;
    }
    Ok(())
}

pub(crate) fn read_store_info<T>(meta: &T) -> StoreResult<Option<StoreInfo>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match meta.get(STORE_INFO_KEY)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

pub(crate) fn write_store_info(txn: &WriteTransaction, info: &StoreInfo) -> StoreResult<()> {
    let mut meta = txn.open_table(META_TABLE)?;
    let bytes = serde_json::to_vec(info)?;
    meta.insert(STORE_INFO_KEY, bytes.as_slice())?;
    Ok(())
}

pub(crate) fn read_schema_version<T>(meta: &T) -> StoreResult<Option<u32>>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match meta.get(SCHEMA_VERSION_KEY)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}
