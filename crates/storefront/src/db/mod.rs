//! Database operations for the store's `PostgreSQL` schema.
//!
//! # Schema: `store`
//!
//! - `products` - Catalog, with per-size stock as a JSONB object
//! - `categories` - Product categories
//! - `orders` - Placed orders with their item snapshot
//! - `users` - Shopper and back-office accounts
//!
//! Sessions live in `tower_sessions.session`, managed by the session store.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p fashion-store-cli -- migrate
//! ```
//!
//! # Store traits
//!
//! The order ledger and stock adjuster only see the traits below, so they can
//! run against the `PostgreSQL` repositories or the in-memory stores in
//! [`memory`].

pub mod categories;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use fashion_store_core::{CategoryId, OrderId, OrderStatus, ProductId, Size, UserId};

use crate::models::{NewOrder, Order, Product, User};

pub use categories::CategoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Product lookups and per-size stock mutation.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch a product, `None` if absent.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Subtract `quantity` from the counter for `size` with no floor.
    ///
    /// Returns `Ok(false)` without changing anything when the product has no
    /// counter for `size`.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the product does not exist.
    async fn decrement_stock(
        &self,
        id: ProductId,
        size: Size,
        quantity: i64,
    ) -> Result<bool, RepositoryError>;

    /// Replace the counter for `size`, creating it if needed.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the product does not exist.
    async fn set_stock(&self, id: ProductId, size: Size, quantity: i64)
    -> Result<(), RepositoryError>;

    /// Add `delta` (which may be negative) to the counter for `size`, treating
    /// a missing counter as zero. Returns the new level.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the product does not exist.
    async fn increment_stock(
        &self,
        id: ProductId,
        size: Size,
        delta: i64,
    ) -> Result<i64, RepositoryError>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Store a new order with status `pending`.
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Overwrite the status, returning the updated order or `None` if absent.
    async fn update_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;
}

/// Category removal, guarded by product references.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Number of products filed under the category.
    async fn count_products(&self, id: CategoryId) -> Result<i64, RepositoryError>;

    /// Delete the category unless a product references it.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Conflict` while referenced, `RepositoryError::NotFound`
    /// if it doesn't exist.
    async fn delete_unreferenced(&self, id: CategoryId) -> Result<(), RepositoryError>;
}

/// Account lookups needed to address order emails.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
