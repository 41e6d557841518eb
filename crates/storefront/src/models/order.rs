//! Placed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fashion_store_core::{OrderId, OrderStatus, Price, UserId};

use super::cart::CartEntry;

/// Where an order ships to, as entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub phone: String,
}

/// A placed order. Everything but `status` is fixed at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Copy of the cart at checkout; never re-resolved against the catalog.
    pub items: Vec<CartEntry>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Order fields supplied by checkout. Status and timestamps are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<CartEntry>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub total_amount: Price,
}
