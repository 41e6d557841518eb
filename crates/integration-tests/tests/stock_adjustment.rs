//! Guarded back-office stock adjustments.

#![allow(clippy::unwrap_used)]

use fashion_store_core::{Price, ProductId, Size, StockAdjustError};
use fashion_store_integration_tests::{Shop, stock};
use fashion_store_storefront::services::stock::{AdjustError, AdjustRequest};

fn request<'r>(size: &'r str, action: &'r str, value: &'r str) -> AdjustRequest<'r> {
    AdjustRequest {
        size,
        action,
        value,
    }
}

#[tokio::test]
async fn test_inc_then_oversized_dec_is_rejected() {
    let shop = Shop::new();
    let admin = shop.admin().await;
    let kurta = shop
        .store
        .add_product("Kurta", Price::ZERO, None, stock(&[(Size::M, 0)]))
        .await;

    let level = shop
        .adjuster()
        .adjust(&admin, kurta, request("M", "inc", "5"))
        .await
        .unwrap();
    assert_eq!(level, 5);

    let result = shop
        .adjuster()
        .adjust(&admin, kurta, request("M", "dec", "10"))
        .await;
    assert!(matches!(
        result,
        Err(AdjustError::Rejected(StockAdjustError::WouldUnderflow {
            current: 5,
            delta: -10
        }))
    ));
    assert_eq!(shop.store.product(kurta).await.unwrap().stock.level(Size::M), 5);
}

#[tokio::test]
async fn test_negative_amounts_never_move_the_counter() {
    let shop = Shop::new();
    let admin = shop.admin().await;
    let kurta = shop
        .store
        .add_product("Kurta", Price::ZERO, None, stock(&[(Size::M, 2)]))
        .await;

    for action in ["dec", "inc"] {
        let result = shop
            .adjuster()
            .adjust(&admin, kurta, request("M", action, "-5"))
            .await;
        assert!(matches!(
            result,
            Err(AdjustError::Rejected(StockAdjustError::InvalidValue(_)))
        ));
    }
    assert_eq!(shop.store.product(kurta).await.unwrap().stock.level(Size::M), 2);
}

#[tokio::test]
async fn test_set_replaces_level() {
    let shop = Shop::new();
    let admin = shop.admin().await;
    let tee = shop
        .store
        .add_product("Tee", Price::ZERO, None, stock(&[(Size::L, 3)]))
        .await;

    let level = shop
        .adjuster()
        .adjust(&admin, tee, request("L", "set", "12"))
        .await
        .unwrap();

    assert_eq!(level, 12);
    assert_eq!(shop.store.product(tee).await.unwrap().stock.level(Size::L), 12);
}

#[tokio::test]
async fn test_recovers_oversold_counter() {
    let shop = Shop::new();
    let admin = shop.admin().await;
    let tee = shop
        .store
        .add_product("Tee", Price::ZERO, None, stock(&[(Size::S, -2)]))
        .await;

    assert!(matches!(
        shop.adjuster().adjust(&admin, tee, request("S", "inc", "1")).await,
        Err(AdjustError::Rejected(StockAdjustError::WouldUnderflow { .. }))
    ));
    let level = shop
        .adjuster()
        .adjust(&admin, tee, request("S", "set", "0"))
        .await
        .unwrap();
    assert_eq!(level, 0);
}

#[tokio::test]
async fn test_malformed_input_is_rejected() {
    let shop = Shop::new();
    let admin = shop.admin().await;
    let tee = shop
        .store
        .add_product("Tee", Price::ZERO, None, stock(&[(Size::S, 1)]))
        .await;

    for (req, expected) in [
        (request("XXL", "set", "1"), "Invalid size"),
        (request("S", "set", "many"), "Invalid value"),
        (request("S", "set", "-1"), "Invalid value"),
        (request("S", "dec", "-5"), "Invalid value"),
        (request("S", "inc", "-1"), "Invalid value"),
        (request("S", "double", "1"), "Invalid action"),
    ] {
        match shop.adjuster().adjust(&admin, tee, req).await {
            Err(AdjustError::Rejected(e)) => {
                assert!(e.is_invalid_input());
                assert_eq!(e.to_string(), expected);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }
    assert_eq!(shop.store.product(tee).await.unwrap().stock.level(Size::S), 1);
}

#[tokio::test]
async fn test_missing_product_and_non_admin() {
    let shop = Shop::new();
    let admin = shop.admin().await;
    let shopper = shop.shopper("ananya").await;

    assert!(matches!(
        shop.adjuster()
            .adjust(&admin, ProductId::new(404), request("S", "set", "1"))
            .await,
        Err(AdjustError::NotFound)
    ));

    let tee = shop
        .store
        .add_product("Tee", Price::ZERO, None, stock(&[(Size::S, 1)]))
        .await;
    assert!(matches!(
        shop.adjuster().adjust(&shopper, tee, request("S", "set", "9")).await,
        Err(AdjustError::Forbidden(_))
    ));
    assert_eq!(shop.store.product(tee).await.unwrap().stock.level(Size::S), 1);
}
