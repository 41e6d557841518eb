//! Checkout through the order ledger.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use fashion_store_core::{OrderId, OrderStatus, Price, Size, UserRole};
use fashion_store_integration_tests::{Shop, checkout, stock};
use fashion_store_storefront::models::{CartEntry, CurrentUser};
use fashion_store_storefront::services::cart::price_entries;
use fashion_store_storefront::services::email::testing::FailingRelay;
use fashion_store_storefront::services::ledger::LedgerError;

fn price(raw: &str) -> Price {
    raw.parse().unwrap()
}

#[tokio::test]
async fn test_oversold_checkout_goes_negative_and_charges_subtotal() {
    let shop = Shop::new();
    let kurta = shop
        .store
        .add_product(
            "Cotton Kurta",
            price("1299.00"),
            None,
            stock(&[(Size::S, 2), (Size::M, 0)]),
        )
        .await;
    let shopper = shop.shopper("ananya").await;

    let mut cart = vec![CartEntry {
        product_id: kurta,
        size: Size::S,
        quantity: 3,
    }];
    let priced = price_entries(&shop.store, &cart).await.unwrap();
    assert_eq!(priced.subtotal, price("3897.00"));

    let order_id = shop
        .ledger()
        .place_order(&shopper, &mut cart, checkout(priced.subtotal))
        .await
        .unwrap();

    let order = shop.ledger().order_for_owner(&shopper, order_id).await.unwrap();
    assert_eq!(order.total_amount, priced.subtotal);
    assert_eq!(order.status.as_str(), "pending");

    let levels = shop.store.product(kurta).await.unwrap().stock;
    assert_eq!(levels.get(Size::S), Some(-1));
    assert_eq!(levels.get(Size::M), Some(0));
}

#[tokio::test]
async fn test_order_snapshot_survives_catalog_changes() {
    let shop = Shop::new();
    let saree = shop
        .store
        .add_product("Silk Saree", price("5499"), None, stock(&[(Size::M, 4)]))
        .await;
    let scarf = shop
        .store
        .add_product("Scarf", price("499"), None, stock(&[(Size::S, 10)]))
        .await;
    let shopper = shop.shopper("meera").await;

    let entries = vec![
        CartEntry {
            product_id: saree,
            size: Size::M,
            quantity: 1,
        },
        CartEntry {
            product_id: scarf,
            size: Size::S,
            quantity: 2,
        },
    ];
    let mut cart = entries.clone();
    let order_id = shop
        .ledger()
        .place_order(&shopper, &mut cart, checkout(price("6497")))
        .await
        .unwrap();

    shop.store
        .edit_product(saree, |product| product.price = price("9999"))
        .await;
    shop.store.remove_product(scarf).await;

    let order = shop.ledger().order_for_owner(&shopper, order_id).await.unwrap();
    assert_eq!(order.items, entries);
    assert_eq!(order.total_amount, price("6497"));
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_relay_outage_keeps_order_and_decrement() {
    let shop = Shop::with_relay(Arc::new(FailingRelay));
    let dress = shop
        .store
        .add_product("Wrap Dress", price("2199"), None, stock(&[(Size::L, 1)]))
        .await;
    let shopper = shop.shopper("isha").await;

    let mut cart = vec![CartEntry {
        product_id: dress,
        size: Size::L,
        quantity: 1,
    }];
    let order_id = shop
        .ledger()
        .place_order(&shopper, &mut cart, checkout(price("2199")))
        .await
        .unwrap();

    assert!(shop.ledger().order_for_owner(&shopper, order_id).await.is_ok());
    assert_eq!(shop.store.product(dress).await.unwrap().stock.level(Size::L), 0);
    assert!(cart.is_empty());
}

#[tokio::test]
async fn test_confirmation_email_reaches_owner() {
    let (shop, relay) = Shop::recording();
    let lehenga = shop
        .store
        .add_product("Lehenga", price("12500"), None, stock(&[(Size::M, 2)]))
        .await;
    let shopper = shop.shopper("diya").await;

    let mut cart = vec![CartEntry {
        product_id: lehenga,
        size: Size::M,
        quantity: 1,
    }];
    let order_id = shop
        .ledger()
        .place_order(&shopper, &mut cart, checkout(price("12500")))
        .await
        .unwrap();

    let sent = relay.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "diya@example.in");
    assert_eq!(sent[0].subject, format!("Order Confirmation - {order_id}"));
    assert!(sent[0].text_body.contains("12,500.00"));
}

#[tokio::test]
async fn test_empty_cart_is_rejected_without_side_effects() {
    let (shop, relay) = Shop::recording();
    let shopper = shop.shopper("ananya").await;

    let mut cart: Vec<CartEntry> = Vec::new();
    let result = shop
        .ledger()
        .place_order(&shopper, &mut cart, checkout(Price::ZERO))
        .await;

    assert!(matches!(result, Err(LedgerError::EmptyCart)));
    assert!(shop.store.orders().await.is_empty());
    assert!(relay.sent().is_empty());
}

#[tokio::test]
async fn test_status_update_notifies_owner() {
    let (shop, relay) = Shop::recording();
    let admin = shop.admin().await;
    let shopper = shop.shopper("kavya").await;

    let mut cart = vec![CartEntry {
        product_id: shop
            .store
            .add_product("Tee", price("399"), None, stock(&[(Size::S, 5)]))
            .await,
        size: Size::S,
        quantity: 1,
    }];
    let order_id = shop
        .ledger()
        .place_order(&shopper, &mut cart, checkout(price("399")))
        .await
        .unwrap();

    let order = shop
        .ledger()
        .update_status(&admin, order_id, OrderStatus::new("shipped"))
        .await
        .unwrap();
    assert_eq!(order.status.as_str(), "shipped");

    let sent = relay.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].subject, format!("Order {order_id} Status: shipped"));
    assert_eq!(sent[1].recipient, "kavya@example.in");
}

/// Place a one-line order for `shopper` and return its id.
async fn place_tee_order(shop: &Shop, shopper: &CurrentUser) -> OrderId {
    let tee = shop
        .store
        .add_product("Tee", price("399"), None, stock(&[(Size::S, 5)]))
        .await;
    let mut cart = vec![CartEntry {
        product_id: tee,
        size: Size::S,
        quantity: 1,
    }];
    shop.ledger()
        .place_order(shopper, &mut cart, checkout(price("399")))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_status_update_survives_relay_outage() {
    let shop = Shop::with_relay(Arc::new(FailingRelay));
    let admin = shop.admin().await;
    let shopper = shop.shopper("rhea").await;
    let order_id = place_tee_order(&shop, &shopper).await;

    let order = shop
        .ledger()
        .update_status(&admin, order_id, OrderStatus::new("delivered"))
        .await
        .unwrap();

    assert_eq!(order.status.as_str(), "delivered");
    let stored = shop.ledger().order_for_owner(&shopper, order_id).await.unwrap();
    assert_eq!(stored.status.as_str(), "delivered");
}

#[tokio::test]
async fn test_status_update_for_owner_without_email() {
    let (shop, relay) = Shop::recording();
    let admin = shop.admin().await;
    let walk_in = CurrentUser::from(&shop.store.add_user("walkin", None, UserRole::User).await);
    let order_id = place_tee_order(&shop, &walk_in).await;

    let order = shop
        .ledger()
        .update_status(&admin, order_id, OrderStatus::new("processing"))
        .await
        .unwrap();

    assert_eq!(order.status.as_str(), "processing");
    assert!(relay.sent().is_empty());
}

#[tokio::test]
async fn test_status_is_stored_verbatim() {
    let shop = Shop::new();
    let admin = shop.admin().await;
    let shopper = shop.shopper("tara").await;
    let order_id = place_tee_order(&shop, &shopper).await;

    for raw in ["  Out for delivery ", ""] {
        let order = shop
            .ledger()
            .update_status(&admin, order_id, OrderStatus::new(raw))
            .await
            .unwrap();
        assert_eq!(order.status.as_str(), raw);
    }
}
