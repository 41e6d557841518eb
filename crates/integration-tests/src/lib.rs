//! Integration tests for Fashion Store.
//!
//! The flows here drive the order ledger, the stock adjuster, and catalog
//! maintenance end to end over [`MemoryStore`], with the notification relay
//! swapped for a recording or failing one. No database or SMTP server is
//! needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fashion-store-integration-tests
//! ```

use std::sync::Arc;

use fashion_store_core::{Email, Price, Size, StockLevels, UserRole};
use fashion_store_storefront::db::memory::MemoryStore;
use fashion_store_storefront::models::{CurrentUser, ShippingAddress};
use fashion_store_storefront::services::email::MailRelay;
use fashion_store_storefront::services::email::testing::RecordingRelay;
use fashion_store_storefront::services::ledger::{Checkout, OrderLedger};
use fashion_store_storefront::services::notifications::NotificationDispatcher;
use fashion_store_storefront::services::stock::StockAdjuster;

pub const SITE_URL: &str = "http://localhost:3000/";

/// A store, its mail relay, and the services built over them.
pub struct Shop {
    pub store: MemoryStore,
    notifier: NotificationDispatcher,
}

impl Shop {
    /// A shop with email disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            notifier: NotificationDispatcher::disabled(),
        }
    }

    /// A shop sending mail through `relay`.
    #[must_use]
    pub fn with_relay(relay: Arc<dyn MailRelay>) -> Self {
        Self {
            store: MemoryStore::new(),
            notifier: NotificationDispatcher::new(relay),
        }
    }

    /// A shop whose outgoing mail is captured.
    #[must_use]
    pub fn recording() -> (Self, Arc<RecordingRelay>) {
        let relay = Arc::new(RecordingRelay::new());
        (Self::with_relay(relay.clone()), relay)
    }

    #[must_use]
    pub fn ledger(&self) -> OrderLedger<'_> {
        OrderLedger::new(&self.store, &self.store, &self.store, &self.notifier, SITE_URL)
    }

    #[must_use]
    pub fn adjuster(&self) -> StockAdjuster<'_> {
        StockAdjuster::new(&self.store)
    }

    /// A shopper with `<username>@example.in` on file.
    pub async fn shopper(&self, username: &str) -> CurrentUser {
        let email = Email::parse(&format!("{username}@example.in")).ok();
        let user = self.store.add_user(username, email, UserRole::User).await;
        CurrentUser::from(&user)
    }

    pub async fn admin(&self) -> CurrentUser {
        let email = Email::parse("admin@fashionstore.com").ok();
        let user = self.store.add_user("admin", email, UserRole::Admin).await;
        CurrentUser::from(&user)
    }
}

impl Default for Shop {
    fn default() -> Self {
        Self::new()
    }
}

/// Checkout form values charging `total`.
#[must_use]
pub fn checkout(total: Price) -> Checkout {
    Checkout {
        shipping_address: ShippingAddress {
            name: "Ananya Rao".to_owned(),
            address: "12 MG Road".to_owned(),
            city: "Bengaluru".to_owned(),
            postal_code: "560001".to_owned(),
            phone: "9845012345".to_owned(),
        },
        payment_method: "cod".to_owned(),
        total_amount: total,
    }
}

/// Stock levels from `(size, count)` pairs.
#[must_use]
pub fn stock(levels: &[(Size, i64)]) -> StockLevels {
    levels.iter().copied().collect()
}
