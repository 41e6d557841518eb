//! Catalog maintenance rules.

#![allow(clippy::unwrap_used)]

use fashion_store_core::{Price, Size};
use fashion_store_integration_tests::{Shop, stock};
use fashion_store_storefront::services::catalog::{self, CatalogError};

#[tokio::test]
async fn test_referenced_category_is_kept() {
    let shop = Shop::new();
    let sarees = shop.store.add_category("Sarees").await;
    let saree = shop
        .store
        .add_product("Silk Saree", Price::ZERO, Some(sarees), stock(&[(Size::M, 1)]))
        .await;

    let before = shop.store.category(sarees).await;
    let result = catalog::delete_category(&shop.store, sarees).await;

    assert!(matches!(
        result,
        Err(CatalogError::CategoryInUse { products: 1 })
    ));
    assert_eq!(shop.store.category(sarees).await, before);
    assert_eq!(
        shop.store.product(saree).await.unwrap().category_id,
        Some(sarees)
    );
}

#[tokio::test]
async fn test_unreferenced_category_is_deleted() {
    let shop = Shop::new();
    let sarees = shop.store.add_category("Sarees").await;
    let kurtas = shop.store.add_category("Kurtas").await;
    shop.store
        .add_product("Kurta", Price::ZERO, Some(kurtas), stock(&[]))
        .await;

    catalog::delete_category(&shop.store, sarees).await.unwrap();

    assert!(shop.store.category(sarees).await.is_none());
    assert!(shop.store.category(kurtas).await.is_some());
}

#[tokio::test]
async fn test_missing_category() {
    let shop = Shop::new();
    let gone = shop.store.add_category("Gone").await;
    catalog::delete_category(&shop.store, gone).await.unwrap();

    assert!(matches!(
        catalog::delete_category(&shop.store, gone).await,
        Err(CatalogError::NotFound)
    ));
}
