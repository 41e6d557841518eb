//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::categories::CategoryRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::services::email::{EmailError, SmtpRelay};
use crate::services::ledger::OrderLedger;
use crate::services::notifications::NotificationDispatcher;
use crate::services::stock::StockAdjuster;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    notifier: NotificationDispatcher,
    site_url: String,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Email goes through SMTP when configured; otherwise notifications are
    /// disabled and every send reports `Disabled`.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the SMTP settings are present but unusable.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, EmailError> {
        let notifier = match &config.email {
            Some(email) => NotificationDispatcher::new(Arc::new(SmtpRelay::new(email)?)),
            None => {
                tracing::warn!("SMTP not configured, order emails are disabled");
                NotificationDispatcher::disabled()
            }
        };
        Ok(Self::with_notifier(config, pool, notifier))
    }

    /// Create state with an explicit dispatcher.
    #[must_use]
    pub fn with_notifier(
        config: StorefrontConfig,
        pool: PgPool,
        notifier: NotificationDispatcher,
    ) -> Self {
        let site_url = config.site_url();
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                notifier,
                site_url,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn notifier(&self) -> &NotificationDispatcher {
        &self.inner.notifier
    }

    #[must_use]
    pub fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.inner.pool)
    }

    #[must_use]
    pub fn categories(&self) -> CategoryRepository<'_> {
        CategoryRepository::new(&self.inner.pool)
    }

    #[must_use]
    pub fn orders(&self) -> OrderRepository<'_> {
        OrderRepository::new(&self.inner.pool)
    }

    #[must_use]
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.inner.pool)
    }
}

/// Postgres-backed repositories for one request, borrowed by the services.
pub struct Stores<'a> {
    pub products: ProductRepository<'a>,
    pub orders: OrderRepository<'a>,
    pub users: UserRepository<'a>,
    state: &'a AppState,
}

impl<'a> Stores<'a> {
    #[must_use]
    pub fn new(state: &'a AppState) -> Self {
        Self {
            products: state.products(),
            orders: state.orders(),
            users: state.users(),
            state,
        }
    }

    /// Order ledger over these stores.
    #[must_use]
    pub fn ledger(&self) -> OrderLedger<'_> {
        OrderLedger::new(
            &self.products,
            &self.orders,
            &self.users,
            self.state.notifier(),
            &self.state.inner.site_url,
        )
    }

    #[must_use]
    pub fn adjuster(&self) -> StockAdjuster<'_> {
        StockAdjuster::new(&self.products)
    }
}
