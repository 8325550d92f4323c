//! 重启后数据保持
//!
//! 关闭并重新打开同一个工作目录，所有集合与店铺信息都应原样恢复。

mod common;

use common::{create_product, test_state};
use pos_edge::data_transfer;
use pos_edge::workflows::{CheckoutDetails, DeliveryRequest};
use pos_edge::{Config, PosState, StoreError};
use shared::models::{Category, DeliveryReceipt, Invoice, Product, StoreInfo};

#[tokio::test]
async fn test_reopen_keeps_records() {
    let (state, dir) = test_state().await;
    let product = create_product(&state, "6281000000116", 250, 4).await;

    let mut cart = state.new_cart();
    cart.add_product(&product.id, 1).await.unwrap();
    let invoice = state
        .checkout
        .checkout(&mut cart, CheckoutDetails::default())
        .await
        .unwrap()
        .invoice;
    state
        .delivery
        .submit(DeliveryRequest {
            invoice_id: invoice.id.clone(),
            customer_name: "سارة".into(),
            customer_phone: "0661 00 00 00".into(),
            delivery_address: "باب الزوار، الجزائر".into(),
            delivered_by: "كريم".into(),
            notes: None,
            delivery_date: None,
        })
        .await
        .unwrap();
    state
        .store
        .set_store_info(&StoreInfo {
            name: "RedOne".into(),
            ..StoreInfo::default()
        })
        .await
        .unwrap();

    let config = state.config.clone();
    state.store.close();
    assert!(matches!(
        state.store.count::<Product>().await,
        Err(StoreError::Closed)
    ));
    drop(state);

    let reopened = PosState::initialize(&config).await.unwrap();
    let stored: Product = reopened.store.require(&product.id).await.unwrap();
    assert_eq!(stored.quantity, 3);
    let stored_invoice: Invoice = reopened.store.require(&invoice.id).await.unwrap();
    assert_eq!(stored_invoice, invoice);
    assert_eq!(reopened.delivery.for_invoice(&invoice.id).await.unwrap().len(), 1);
    assert_eq!(reopened.store.count::<DeliveryReceipt>().await.unwrap(), 1);
    assert_eq!(reopened.store.store_info().await.unwrap().name, "RedOne");
    assert!(dir.path().join("database").join("RedOnePOS.redb").exists());
}

#[tokio::test]
async fn test_backup_restores_into_new_work_dir() {
    let (source, _src_dir) = test_state().await;
    create_product(&source, "6281000000123", 90, 12).await;
    source.catalog.add_category("حافظات", None).await.unwrap();
    let json = data_transfer::export_json(&source.store).await.unwrap();

    let target_dir = tempfile::tempdir().unwrap();
    let mut config = Config::with_work_dir(target_dir.path().to_string_lossy());
    config.database_name = "RedOnePOS".into();
    config.seed_default_categories = true;
    let target = PosState::initialize(&config).await.unwrap();
    assert!(target.store.count::<Category>().await.unwrap() > 1);

    let summary = data_transfer::import_json(&target.store, &json).await.unwrap();
    assert_eq!(summary.products, 1);
    assert_eq!(summary.categories, 1);

    // Seeded categories were replaced by the backup
    let categories: Vec<Category> = target.store.get_all().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "حافظات");
    let product = target.catalog.product_by_barcode("6281000000123").await.unwrap();
    assert_eq!(product.map(|p| p.quantity), Some(12));
}
