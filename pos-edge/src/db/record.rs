//! Record kinds and their index definitions
//!
//! Every persisted type implements [`Record`], which names its collection, its
//! primary id and the values it contributes to each secondary index.

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{
    Category, DamagedProduct, DeliveryReceipt, Invoice, Product, ReturnItem, StockAlert,
};
use std::fmt;

/// Secondary index definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    /// At most one record may hold a given value
    pub unique: bool,
}

const fn index(name: &'static str) -> IndexDef {
    IndexDef {
        name,
        unique: false,
    }
}

const fn unique(name: &'static str) -> IndexDef {
    IndexDef { name, unique: true }
}

const PRODUCT_INDEXES: &[IndexDef] = &[unique("barcode"), index("name"), index("category")];
const CATEGORY_INDEXES: &[IndexDef] = &[unique("name")];
const INVOICE_INDEXES: &[IndexDef] = &[index("createdAt")];
const DAMAGE_INDEXES: &[IndexDef] = &[index("productId"), index("status")];
const RETURN_INDEXES: &[IndexDef] = &[
    index("originalInvoiceId"),
    index("productId"),
    index("status"),
];
const DELIVERY_INDEXES: &[IndexDef] = &[index("invoiceId"), index("status")];
const ALERT_INDEXES: &[IndexDef] = &[index("productId"), index("acknowledged")];

/// Keyed collections in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Categories,
    Invoices,
    DamagedProducts,
    Returns,
    DeliveryReceipts,
    StockAlerts,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Products,
        Collection::Categories,
        Collection::Invoices,
        Collection::DamagedProducts,
        Collection::Returns,
        Collection::DeliveryReceipts,
        Collection::StockAlerts,
    ];

    /// Table name of the primary records
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Categories => "categories",
            Collection::Invoices => "invoices",
            Collection::DamagedProducts => "damaged_products",
            Collection::Returns => "returns",
            Collection::DeliveryReceipts => "delivery_receipts",
            Collection::StockAlerts => "stock_alerts",
        }
    }

    /// Table name of the secondary index entries
    pub fn index_table_name(&self) -> &'static str {
        match self {
            Collection::Products => "products_idx",
            Collection::Categories => "categories_idx",
            Collection::Invoices => "invoices_idx",
            Collection::DamagedProducts => "damaged_products_idx",
            Collection::Returns => "returns_idx",
            Collection::DeliveryReceipts => "delivery_receipts_idx",
            Collection::StockAlerts => "stock_alerts_idx",
        }
    }

    pub fn indexes(&self) -> &'static [IndexDef] {
        match self {
            Collection::Products => PRODUCT_INDEXES,
            Collection::Categories => CATEGORY_INDEXES,
            Collection::Invoices => INVOICE_INDEXES,
            Collection::DamagedProducts => DAMAGE_INDEXES,
            Collection::Returns => RETURN_INDEXES,
            Collection::DeliveryReceipts => DELIVERY_INDEXES,
            Collection::StockAlerts => ALERT_INDEXES,
        }
    }

    pub fn index_def(&self, name: &str) -> Option<IndexDef> {
        self.indexes().iter().copied().find(|def| def.name == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A record kind owned by the store
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// `(index name, value)` for every index of the collection
    fn index_values(&self) -> Vec<(&'static str, String)>;
}

/// Timestamps are indexed zero-padded so lexical order matches numeric order.
pub fn timestamp_key(millis: i64) -> String {
    format!("{:020}", millis.max(0))
}

impl Record for Product {
    const COLLECTION: Collection = Collection::Products;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("barcode", self.barcode.clone()),
            ("name", self.name.clone()),
            ("category", self.category.clone()),
        ]
    }
}

impl Record for Category {
    const COLLECTION: Collection = Collection::Categories;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone())]
    }
}

impl Record for Invoice {
    const COLLECTION: Collection = Collection::Invoices;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<(&'static str, String)> {
        vec![("createdAt", timestamp_key(self.created_at))]
    }
}

impl Record for DamagedProduct {
    const COLLECTION: Collection = Collection::DamagedProducts;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("productId", self.product_id.clone()),
            ("status", self.status.as_str().to_string()),
        ]
    }
}

impl Record for ReturnItem {
    const COLLECTION: Collection = Collection::Returns;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("originalInvoiceId", self.original_invoice_id.clone()),
            ("productId", self.product_id.clone()),
            ("status", self.status.as_str().to_string()),
        ]
    }
}

impl Record for DeliveryReceipt {
    const COLLECTION: Collection = Collection::DeliveryReceipts;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("invoiceId", self.invoice_id.clone()),
            ("status", self.status.as_str().to_string()),
        ]
    }
}

impl Record for StockAlert {
    const COLLECTION: Collection = Collection::StockAlerts;

    fn id(&self) -> &str {
        &self.id
    }

    fn index_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("productId", self.product_id.clone()),
            ("acknowledged", self.acknowledged.to_string()),
        ]
    }
}
