//! 集成测试公共工具

#![allow(dead_code)]

use pos_edge::{Config, PosState};
use rust_decimal::Decimal;
use shared::models::{Product, ProductCreate};
use shared::types::Quantity;
use tempfile::TempDir;

/// 临时工作目录上的完整终端状态 (不预置分类)
pub async fn test_state() -> (PosState, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::with_work_dir(dir.path().to_string_lossy());
    config.database_name = "RedOnePOS".into();
    config.seed_default_categories = false;
    config.low_stock_threshold = 5;
    let state = PosState::initialize(&config).await.expect("initialize");
    (state, dir)
}

pub async fn create_product(
    state: &PosState,
    barcode: &str,
    sale_price: i64,
    quantity: Quantity,
) -> Product {
    state
        .catalog
        .create_product(ProductCreate {
            name: format!("منتج {}", barcode),
            barcode: barcode.into(),
            purchase_price: Decimal::from(sale_price / 2),
            sale_price: Decimal::from(sale_price),
            quantity,
            category: "إكسسوارات الهواتف".into(),
            description: None,
            image: None,
        })
        .await
        .expect("create product")
}

pub async fn quantity_of(state: &PosState, id: &str) -> Quantity {
    state
        .store
        .require::<Product>(id)
        .await
        .expect("product exists")
        .quantity
}
