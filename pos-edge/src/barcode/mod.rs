//! Barcode intake
//!
//! - [`scanner`]: turns a keyboard-wedge scanner's key stream into barcodes
//! - [`generator`]: codes for products that arrive without one

pub mod generator;
pub mod scanner;

pub use generator::{
    ean13_check_digit, format_ean13, generate_code128, generate_custom, generate_ean13,
    validate_ean13,
};
pub use scanner::{BarcodeScanner, Key, ListenerId, SCAN_KEY_GAP_MS};

use shared::models::Product;

use crate::db::{PosStore, StoreResult};

/// Product carrying this barcode, if any
pub async fn resolve_product(store: &PosStore, barcode: &str) -> StoreResult<Option<Product>> {
    let product = store.get_by_index::<Product>("barcode", barcode).await?;
    if product.is_none() {
        tracing::debug!(barcode, "Scanned barcode matches no product");
    }
    Ok(product)
}
