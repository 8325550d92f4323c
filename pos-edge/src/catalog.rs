//! Catalog management
//!
//! Product and category CRUD. Full-record product edits go through here and
//! may set `quantity` directly; every other stock change goes through the
//! inventory ledger.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, DEFAULT_CATEGORIES, Product, ProductCreate, ProductUpdate};
use shared::types::Quantity;
use shared::util::{new_record_id, now_millis};
use thiserror::Error;

use crate::db::{PosStore, StoreError};

/// Highest accepted unit price; keeps every line total far inside `Decimal` range
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Field '{0}' is required")]
    RequiredField(&'static str),

    #[error("{field} must not be negative: {value}")]
    NegativePrice { field: &'static str, value: Decimal },

    #[error("{field} must not exceed {max}: {value}")]
    PriceOutOfRange {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("Quantity must not be negative: {0}")]
    NegativeQuantity(Quantity),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CatalogError::RequiredField(_) => ErrorCode::RequiredField,
            CatalogError::NegativePrice { .. } => ErrorCode::InvalidPrice,
            CatalogError::PriceOutOfRange { .. } => ErrorCode::ValueOutOfRange,
            CatalogError::NegativeQuantity(_) => ErrorCode::InvalidQuantity,
            CatalogError::Store(e) => e.error_code(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Store(e) => e.into(),
            other => AppError::with_message(other.error_code(), other.to_string()),
        }
    }
}

/// Normalized product fields shared by create and update
struct ProductFields {
    name: String,
    barcode: String,
    purchase_price: Decimal,
    sale_price: Decimal,
    quantity: Quantity,
    category: String,
    description: Option<String>,
}

fn required(value: &str, field: &'static str) -> CatalogResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::RequiredField(field));
    }
    Ok(value.to_string())
}

#[allow(clippy::too_many_arguments)]
fn validate_fields(
    name: &str,
    barcode: &str,
    purchase_price: Decimal,
    sale_price: Decimal,
    quantity: Quantity,
    category: &str,
    description: Option<&str>,
) -> CatalogResult<ProductFields> {
    let fields = ProductFields {
        name: required(name, "name")?,
        barcode: required(barcode, "barcode")?,
        purchase_price,
        sale_price,
        quantity,
        category: required(category, "category")?,
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    };
    for (field, value) in [("purchasePrice", purchase_price), ("salePrice", sale_price)] {
        if value < Decimal::ZERO {
            return Err(CatalogError::NegativePrice { field, value });
        }
        if value > MAX_PRICE {
            return Err(CatalogError::PriceOutOfRange {
                field,
                value,
                max: MAX_PRICE,
            });
        }
    }
    if quantity < 0 {
        return Err(CatalogError::NegativeQuantity(quantity));
    }
    Ok(fields)
}

/// Case-insensitive name match or barcode substring, plus optional exact category
pub fn matches_search(product: &Product, query: &str, category: Option<&str>) -> bool {
    let query = query.trim();
    let text_match = query.is_empty()
        || product.name.to_lowercase().contains(&query.to_lowercase())
        || product.barcode.contains(query);
    let category_match = category.is_none_or(|c| c.is_empty() || product.category == c);
    text_match && category_match
}

#[derive(Debug, Clone)]
pub struct Catalog {
    store: PosStore,
}

impl Catalog {
    pub fn new(store: PosStore) -> Self {
        Self { store }
    }

    // ========== Products ==========

    /// Create a product; a barcode already in use fails with `DuplicateKey`.
    pub async fn create_product(&self, data: ProductCreate) -> CatalogResult<Product> {
        let fields = validate_fields(
            &data.name,
            &data.barcode,
            data.purchase_price,
            data.sale_price,
            data.quantity,
            &data.category,
            data.description.as_deref(),
        )?;
        let now = now_millis();
        let product = Product {
            id: new_record_id(),
            name: fields.name,
            barcode: fields.barcode,
            purchase_price: fields.purchase_price,
            sale_price: fields.sale_price,
            quantity: fields.quantity,
            category: fields.category,
            description: fields.description,
            image: data.image,
            created_at: now,
            updated_at: now,
        };
        self.store.add(&product).await?;
        tracing::info!(
            target: "audit",
            product_id = %product.id,
            barcode = %product.barcode,
            quantity = product.quantity,
            "Product created"
        );
        Ok(product)
    }

    /// Full-record edit. Keeps id and `createdAt`; an absent image keeps the stored one.
    pub async fn update_product(&self, id: &str, data: ProductUpdate) -> CatalogResult<Product> {
        let fields = validate_fields(
            &data.name,
            &data.barcode,
            data.purchase_price,
            data.sale_price,
            data.quantity,
            &data.category,
            data.description.as_deref(),
        )?;
        let existing: Product = self.store.require(id).await?;
        let product = Product {
            id: existing.id,
            name: fields.name,
            barcode: fields.barcode,
            purchase_price: fields.purchase_price,
            sale_price: fields.sale_price,
            quantity: fields.quantity,
            category: fields.category,
            description: fields.description,
            image: data.image.or(existing.image),
            created_at: existing.created_at,
            updated_at: now_millis(),
        };
        self.store.put(&product).await?;
        tracing::info!(
            target: "audit",
            product_id = %product.id,
            previous_quantity = existing.quantity,
            quantity = product.quantity,
            "Product updated"
        );
        Ok(product)
    }

    /// Delete a product; historical records keep their embedded snapshot.
    pub async fn delete_product(&self, id: &str) -> CatalogResult<bool> {
        let removed = self.store.delete::<Product>(id).await?;
        if removed {
            crate::audit_log!("delete", format!("product:{}", id));
        }
        Ok(removed)
    }

    pub async fn get_product(&self, id: &str) -> CatalogResult<Option<Product>> {
        Ok(self.store.get(id).await?)
    }

    pub async fn product_by_barcode(&self, barcode: &str) -> CatalogResult<Option<Product>> {
        Ok(self.store.get_by_index("barcode", barcode.trim()).await?)
    }

    /// All products sorted by name
    pub async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        let mut products: Vec<Product> = self.store.get_all().await?;
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    pub async fn search_products(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> CatalogResult<Vec<Product>> {
        let mut products = self.list_products().await?;
        products.retain(|p| matches_search(p, query, category));
        Ok(products)
    }

    // ========== Categories ==========

    /// Add a category; the trimmed name must be unique.
    pub async fn add_category(
        &self,
        name: &str,
        description: Option<String>,
    ) -> CatalogResult<Category> {
        let category = Category {
            id: new_record_id(),
            name: required(name, "name")?,
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };
        self.store.add(&category).await?;
        tracing::info!(category = %category.name, "Category added");
        Ok(category)
    }

    /// All categories sorted by name
    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.store.get_all().await?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    /// Insert the default categories when none exist; returns how many were added.
    pub async fn seed_default_categories(&self) -> CatalogResult<usize> {
        if self.store.count::<Category>().await? > 0 {
            return Ok(0);
        }
        let mut added = 0;
        for name in DEFAULT_CATEGORIES {
            match self.add_category(name, None).await {
                Ok(_) => added += 1,
                Err(CatalogError::Store(e)) if e.is_duplicate() => {}
                Err(e) => return Err(e),
            }
        }
        tracing::info!(count = added, "Default categories seeded");
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(barcode: &str, name: &str) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            barcode: barcode.into(),
            purchase_price: Decimal::from(100),
            sale_price: Decimal::from(150),
            quantity: 4,
            category: "كابلات".into(),
            description: Some("  ".into()),
            image: None,
        }
    }

    fn update_from(p: &Product) -> ProductUpdate {
        ProductUpdate {
            name: p.name.clone(),
            barcode: p.barcode.clone(),
            purchase_price: p.purchase_price,
            sale_price: p.sale_price,
            quantity: p.quantity,
            category: p.category.clone(),
            description: p.description.clone(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let catalog = Catalog::new(PosStore::open_in_memory().unwrap());
        let p = catalog.create_product(create("111", "USB-C Cable")).await.unwrap();
        assert_eq!(p.description, None);
        assert_eq!(p.created_at, p.updated_at);

        let found = catalog.product_by_barcode("111").await.unwrap().unwrap();
        assert_eq!(found.id, p.id);
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let catalog = Catalog::new(PosStore::open_in_memory().unwrap());
        catalog.create_product(create("111", "A")).await.unwrap();
        let err = catalog.create_product(create("111", "B")).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::BarcodeAlreadyExists);
        assert_eq!(catalog.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation() {
        let catalog = Catalog::new(PosStore::open_in_memory().unwrap());

        let err = catalog.create_product(create("", "A")).await.unwrap_err();
        assert!(matches!(err, CatalogError::RequiredField("barcode")));

        let mut negative = create("1", "A");
        negative.sale_price = Decimal::from(-1);
        let err = catalog.create_product(negative).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidPrice);

        let mut negative = create("1", "A");
        negative.quantity = -3;
        let err = catalog.create_product(negative).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidQuantity);
    }

    #[tokio::test]
    async fn test_price_upper_bound() {
        let catalog = Catalog::new(PosStore::open_in_memory().unwrap());

        let mut huge = create("1", "A");
        huge.sale_price = Decimal::MAX;
        let err = catalog.create_product(huge).await.unwrap_err();
        assert!(matches!(err, CatalogError::PriceOutOfRange { field: "salePrice", .. }));
        assert_eq!(err.error_code(), ErrorCode::ValueOutOfRange);

        let mut huge = create("1", "A");
        huge.purchase_price = MAX_PRICE + Decimal::ONE;
        let err = catalog.create_product(huge).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ValueOutOfRange);

        let mut at_limit = create("1", "A");
        at_limit.sale_price = MAX_PRICE;
        let p = catalog.create_product(at_limit).await.unwrap();

        let mut update = update_from(&p);
        update.sale_price = Decimal::MAX;
        let err = catalog.update_product(&p.id, update).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ValueOutOfRange);
        let stored = catalog.get_product(&p.id).await.unwrap().unwrap();
        assert_eq!(stored.sale_price, MAX_PRICE);
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_image() {
        let catalog = Catalog::new(PosStore::open_in_memory().unwrap());
        let mut data = create("111", "A");
        data.image = Some("data:image/png;base64,AAAA".into());
        let p = catalog.create_product(data).await.unwrap();

        let mut edit = update_from(&p);
        edit.name = "Renamed".into();
        edit.quantity = 20;
        let updated = catalog.update_product(&p.id, edit).await.unwrap();
        assert_eq!(updated.id, p.id);
        assert_eq!(updated.created_at, p.created_at);
        assert_eq!(updated.quantity, 20);
        assert_eq!(updated.image, p.image);

        let err = catalog
            .update_product("ghost", update_from(&p))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ProductNotFound);
    }

    #[tokio::test]
    async fn test_update_cannot_steal_barcode() {
        let catalog = Catalog::new(PosStore::open_in_memory().unwrap());
        catalog.create_product(create("111", "A")).await.unwrap();
        let b = catalog.create_product(create("222", "B")).await.unwrap();

        let mut edit = update_from(&b);
        edit.barcode = "111".into();
        let err = catalog.update_product(&b.id, edit).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::BarcodeAlreadyExists);
    }

    #[tokio::test]
    async fn test_search() {
        let catalog = Catalog::new(PosStore::open_in_memory().unwrap());
        catalog.create_product(create("6131", "Samsung Charger")).await.unwrap();
        let mut other = create("7777", "Jbl Speaker");
        other.category = "مكبرات صوت".into();
        catalog.create_product(other).await.unwrap();

        assert_eq!(catalog.search_products("charger", None).await.unwrap().len(), 1);
        assert_eq!(catalog.search_products("77", None).await.unwrap().len(), 1);
        assert_eq!(catalog.search_products("", None).await.unwrap().len(), 2);
        assert_eq!(
            catalog
                .search_products("", Some("مكبرات صوت"))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_categories_seed_once_and_stay_unique() {
        let catalog = Catalog::new(PosStore::open_in_memory().unwrap());
        assert_eq!(catalog.seed_default_categories().await.unwrap(), 10);
        assert_eq!(catalog.seed_default_categories().await.unwrap(), 0);
        assert_eq!(catalog.list_categories().await.unwrap().len(), 10);

        let err = catalog.add_category(" كابلات ", None).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::CategoryAlreadyExists);
        let err = catalog.add_category("   ", None).await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::RequiredField);
    }
}
