//! The order ledger.
//!
//! Checkout turns a cart into an order and then takes the ordered quantities
//! off the catalog. The order is written first; each stock decrement after it
//! is a separate statement with no availability check, so counters can go
//! negative and a failed decrement does not undo the order. There is no
//! transaction spanning the two.
//!
//! Status updates are back-office only and accept any status string.

use thiserror::Error;

use fashion_store_core::{OrderId, OrderStatus, Price};

use super::authz::{Forbidden, require_admin};
use super::cart::{CartError, CartHolder};
use super::notifications::{
    DispatchOutcome, NotificationContext, NotificationDispatcher, ORDER_CONFIRMATION,
    ORDER_STATUS_UPDATE,
};
use crate::db::{CatalogStore, OrderStore, RepositoryError, UserDirectory};
use crate::models::{CurrentUser, NewOrder, Order, ShippingAddress};

/// Errors from order ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The order does not exist (or is not the caller's).
    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checkout form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    /// Amount charged, as shown to the shopper at checkout.
    pub total_amount: Price,
}

/// Order creation and status changes over the store traits.
pub struct OrderLedger<'a> {
    catalog: &'a dyn CatalogStore,
    orders: &'a dyn OrderStore,
    users: &'a dyn UserDirectory,
    notifier: &'a NotificationDispatcher,
    site_url: &'a str,
}

impl<'a> OrderLedger<'a> {
    #[must_use]
    pub const fn new(
        catalog: &'a dyn CatalogStore,
        orders: &'a dyn OrderStore,
        users: &'a dyn UserDirectory,
        notifier: &'a NotificationDispatcher,
        site_url: &'a str,
    ) -> Self {
        Self {
            catalog,
            orders,
            users,
            notifier,
            site_url,
        }
    }

    /// Place an order for `user` from the contents of `cart`.
    ///
    /// The cart is cleared only once the order is stored. The confirmation
    /// email is attempted afterwards and its outcome does not affect the result.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::EmptyCart`] if the cart has no entries; nothing is written.
    /// - [`LedgerError::Cart`] if the cart cannot be read.
    /// - [`LedgerError::Repository`] if the order cannot be stored.
    #[tracing::instrument(skip(self, user, cart, checkout), fields(user_id = %user.id))]
    pub async fn place_order(
        &self,
        user: &CurrentUser,
        cart: &mut dyn CartHolder,
        checkout: Checkout,
    ) -> Result<OrderId, LedgerError> {
        let entries = cart.read_entries().await?;
        if entries.is_empty() {
            return Err(LedgerError::EmptyCart);
        }

        let order = self
            .orders
            .insert(NewOrder {
                user_id: user.id,
                items: entries,
                shipping_address: checkout.shipping_address,
                payment_method: checkout.payment_method,
                total_amount: checkout.total_amount,
            })
            .await?;

        tracing::info!(
            order_id = %order.id,
            items = order.items.len(),
            total = %order.total_amount,
            "order placed"
        );

        self.take_stock(&order).await;

        if let Err(e) = cart.clear().await {
            tracing::warn!(order_id = %order.id, error = %e, "failed to clear cart after checkout");
        }

        self.notify_owner(&order, ORDER_CONFIRMATION, None).await;

        Ok(order.id)
    }

    /// Subtract each ordered quantity from its product's counter.
    async fn take_stock(&self, order: &Order) {
        for entry in &order.items {
            match self
                .catalog
                .decrement_stock(entry.product_id, entry.size, i64::from(entry.quantity))
                .await
            {
                Ok(true) => {}
                Ok(false) => tracing::debug!(
                    order_id = %order.id,
                    product_id = %entry.product_id,
                    size = %entry.size,
                    "size not tracked, stock unchanged"
                ),
                Err(RepositoryError::NotFound) => tracing::debug!(
                    order_id = %order.id,
                    product_id = %entry.product_id,
                    "product no longer exists, stock unchanged"
                ),
                Err(e) => tracing::warn!(
                    order_id = %order.id,
                    product_id = %entry.product_id,
                    size = %entry.size,
                    error = %e,
                    "stock decrement failed"
                ),
            }
        }
    }

    /// Set an order's status to `status` and tell its owner.
    ///
    /// No transition rules apply; any string is stored as given.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Forbidden`] unless `actor` is an admin.
    /// - [`LedgerError::NotFound`] if the order does not exist.
    #[tracing::instrument(skip(self, actor, status), fields(actor_id = %actor.id, status = %status))]
    pub async fn update_status(
        &self,
        actor: &CurrentUser,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, LedgerError> {
        require_admin(actor)?;

        let order = self
            .orders
            .update_status(order_id, &status)
            .await?
            .ok_or(LedgerError::NotFound)?;

        tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

        self.notify_owner(&order, ORDER_STATUS_UPDATE, Some(status))
            .await;

        Ok(order)
    }

    /// An order, visible only to the user who placed it.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotFound`] if it does not exist or belongs to someone else.
    pub async fn order_for_owner(
        &self,
        user: &CurrentUser,
        order_id: OrderId,
    ) -> Result<Order, LedgerError> {
        self.orders
            .get(order_id)
            .await?
            .filter(|order| order.user_id == user.id)
            .ok_or(LedgerError::NotFound)
    }

    /// Any order, for the back-office.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Forbidden`] unless `actor` is an admin,
    /// [`LedgerError::NotFound`] if it does not exist.
    pub async fn order_for_admin(
        &self,
        actor: &CurrentUser,
        order_id: OrderId,
    ) -> Result<Order, LedgerError> {
        require_admin(actor)?;
        self.orders
            .get(order_id)
            .await?
            .ok_or(LedgerError::NotFound)
    }

    /// Email the order's owner, if they have an address on file.
    async fn notify_owner(
        &self,
        order: &Order,
        template: &str,
        status: Option<OrderStatus>,
    ) -> DispatchOutcome {
        let owner = match self.users.get_by_id(order.user_id).await {
            Ok(owner) => owner,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "could not look up order owner");
                return DispatchOutcome::Failed;
            }
        };
        let Some(email) = owner.and_then(|user| user.email) else {
            tracing::debug!(order_id = %order.id, "order owner has no email on file");
            return DispatchOutcome::Disabled;
        };

        let mut ctx = NotificationContext::for_order(order, self.site_url);
        if let Some(status) = status {
            ctx = ctx.with_status(status);
        }

        self.notifier.send(template, &ctx, &email).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use fashion_store_core::{Email, ProductId, Size, StockLevels, UserRole};

    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::CartEntry;
    use crate::services::email::testing::RecordingRelay;

    const SITE: &str = "http://localhost:3000/";

    fn checkout(total: &str) -> Checkout {
        Checkout {
            shipping_address: ShippingAddress {
                name: "Kabir Singh".to_owned(),
                address: "4 Park Street".to_owned(),
                city: "Kolkata".to_owned(),
                postal_code: "700016".to_owned(),
                phone: "9830012345".to_owned(),
            },
            payment_method: "cod".to_owned(),
            total_amount: total.parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let store = MemoryStore::new();
        let shopper = store.add_user("kabir", None, UserRole::User).await;
        let notifier = NotificationDispatcher::disabled();
        let ledger = OrderLedger::new(&store, &store, &store, &notifier, SITE);

        let mut cart: Vec<CartEntry> = Vec::new();
        let result = ledger
            .place_order(&CurrentUser::from(&shopper), &mut cart, checkout("0"))
            .await;

        assert!(matches!(result, Err(LedgerError::EmptyCart)));
        assert!(store.orders().await.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_sends_confirmation_and_clears_cart() {
        let store = MemoryStore::new();
        let product = store
            .add_product(
                "Denim Jacket",
                "2499".parse().unwrap(),
                None,
                [(Size::L, 3)].into_iter().collect(),
            )
            .await;
        let shopper = store
            .add_user(
                "kabir",
                Some(Email::parse("kabir@example.in").unwrap()),
                UserRole::User,
            )
            .await;
        let relay = Arc::new(RecordingRelay::new());
        let notifier = NotificationDispatcher::new(relay.clone());
        let ledger = OrderLedger::new(&store, &store, &store, &notifier, SITE);

        let mut cart = vec![CartEntry {
            product_id: product,
            size: Size::L,
            quantity: 1,
        }];
        let order_id = ledger
            .place_order(&CurrentUser::from(&shopper), &mut cart, checkout("2499"))
            .await
            .unwrap();

        assert!(cart.is_empty());
        assert_eq!(store.product(product).await.unwrap().stock.level(Size::L), 2);
        let sent = relay.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, format!("Order Confirmation - {order_id}"));
    }

    #[tokio::test]
    async fn test_untracked_size_is_skipped() {
        let store = MemoryStore::new();
        let product = store
            .add_product("Tee", "399".parse().unwrap(), None, StockLevels::new())
            .await;
        let shopper = store.add_user("kabir", None, UserRole::User).await;
        let notifier = NotificationDispatcher::disabled();
        let ledger = OrderLedger::new(&store, &store, &store, &notifier, SITE);

        let mut cart = vec![CartEntry {
            product_id: product,
            size: Size::XL,
            quantity: 2,
        }];
        ledger
            .place_order(&CurrentUser::from(&shopper), &mut cart, checkout("798"))
            .await
            .unwrap();

        assert_eq!(store.product(product).await.unwrap().stock.get(Size::XL), None);
        assert_eq!(store.orders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_product_does_not_block_checkout() {
        let store = MemoryStore::new();
        let shopper = store.add_user("kabir", None, UserRole::User).await;
        let notifier = NotificationDispatcher::disabled();
        let ledger = OrderLedger::new(&store, &store, &store, &notifier, SITE);

        let mut cart = vec![CartEntry {
            product_id: ProductId::new(404),
            size: Size::S,
            quantity: 1,
        }];
        let result = ledger
            .place_order(&CurrentUser::from(&shopper), &mut cart, checkout("0"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_status_update_requires_admin() {
        let store = MemoryStore::new();
        let shopper = store.add_user("kabir", None, UserRole::User).await;
        let notifier = NotificationDispatcher::disabled();
        let ledger = OrderLedger::new(&store, &store, &store, &notifier, SITE);

        let result = ledger
            .update_status(
                &CurrentUser::from(&shopper),
                OrderId::new(1),
                OrderStatus::new("shipped"),
            )
            .await;

        assert!(matches!(result, Err(LedgerError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_status_update_missing_order() {
        let store = MemoryStore::new();
        let admin = store.add_user("admin", None, UserRole::Admin).await;
        let notifier = NotificationDispatcher::disabled();
        let ledger = OrderLedger::new(&store, &store, &store, &notifier, SITE);

        let result = ledger
            .update_status(
                &CurrentUser::from(&admin),
                OrderId::new(999),
                OrderStatus::new("shipped"),
            )
            .await;

        assert!(matches!(result, Err(LedgerError::NotFound)));
    }

    #[tokio::test]
    async fn test_other_users_order_is_hidden() {
        let store = MemoryStore::new();
        let owner = store.add_user("kabir", None, UserRole::User).await;
        let other = store.add_user("zoya", None, UserRole::User).await;
        let notifier = NotificationDispatcher::disabled();
        let ledger = OrderLedger::new(&store, &store, &store, &notifier, SITE);

        let mut cart = vec![CartEntry {
            product_id: ProductId::new(1),
            size: Size::S,
            quantity: 1,
        }];
        let order_id = ledger
            .place_order(&CurrentUser::from(&owner), &mut cart, checkout("0"))
            .await
            .unwrap();

        assert!(ledger.order_for_owner(&CurrentUser::from(&owner), order_id).await.is_ok());
        assert!(matches!(
            ledger.order_for_owner(&CurrentUser::from(&other), order_id).await,
            Err(LedgerError::NotFound)
        ));
    }
}
