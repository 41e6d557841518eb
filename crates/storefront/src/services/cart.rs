//! Cart storage.
//!
//! The cart belongs to the shopper's session. Checkout only needs to read it
//! and empty it, which is what [`CartHolder`] exposes.

use async_trait::async_trait;
use thiserror::Error;
use tower_sessions::Session;

use fashion_store_core::{Price, ProductId, Size};

use crate::db::{CatalogStore, RepositoryError};
use crate::models::{Cart, CartEntry, Product, session_keys};

/// Cart storage failed.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Read-and-clear access to a cart.
#[async_trait]
pub trait CartHolder: Send + Sync {
    /// The entries, in the order they were added.
    async fn read_entries(&self) -> Result<Vec<CartEntry>, CartError>;

    /// Remove every entry.
    async fn clear(&mut self) -> Result<(), CartError>;
}

/// A cart stored under [`session_keys::CART`].
#[derive(Clone)]
pub struct SessionCart {
    session: Session,
}

impl SessionCart {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Load the cart; an absent cart is empty.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    pub async fn load(&self) -> Result<Cart, CartError> {
        Ok(self
            .session
            .get::<Cart>(session_keys::CART)
            .await?
            .unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    pub async fn save(&self, cart: &Cart) -> Result<(), CartError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }

    /// Add an item, topping up an existing line for the same product and size.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    pub async fn add(
        &self,
        product_id: ProductId,
        size: Size,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        cart.add(product_id, size, quantity);
        self.save(&cart).await?;
        Ok(cart)
    }

    /// Remove the line at `index`; out-of-range indexes change nothing.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Session` if the session store fails.
    pub async fn remove(&self, index: usize) -> Result<Cart, CartError> {
        let mut cart = self.load().await?;
        if cart.remove(index).is_some() {
            self.save(&cart).await?;
        }
        Ok(cart)
    }
}

#[async_trait]
impl CartHolder for SessionCart {
    async fn read_entries(&self) -> Result<Vec<CartEntry>, CartError> {
        Ok(self.load().await?.into_entries())
    }

    async fn clear(&mut self) -> Result<(), CartError> {
        self.session.remove::<Cart>(session_keys::CART).await?;
        Ok(())
    }
}

#[async_trait]
impl CartHolder for Vec<CartEntry> {
    async fn read_entries(&self) -> Result<Vec<CartEntry>, CartError> {
        Ok(self.clone())
    }

    async fn clear(&mut self) -> Result<(), CartError> {
        Vec::clear(self);
        Ok(())
    }
}

/// A cart entry joined with its current catalog record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PricedLine {
    /// Position in the cart, as used by `/cart/remove/{index}`.
    pub index: usize,
    pub entry: CartEntry,
    pub product: Product,
    pub line_total: Price,
}

/// Cart entries priced against the catalog as it is now.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    /// Sum of price times quantity over entries whose product still exists.
    pub subtotal: Price,
}

/// Price `entries` at current catalog prices.
///
/// Entries whose product has been deleted are left out of the lines and the
/// subtotal.
///
/// # Errors
///
/// Returns `RepositoryError` if a product lookup fails.
pub async fn price_entries(
    catalog: &dyn CatalogStore,
    entries: &[CartEntry],
) -> Result<PricedCart, RepositoryError> {
    let mut lines = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        if let Some(product) = catalog.get_product(entry.product_id).await? {
            lines.push(PricedLine {
                index,
                entry: *entry,
                line_total: product.price.times(entry.quantity),
                product,
            });
        }
    }
    let subtotal = lines.iter().map(|line| line.line_total).sum();
    Ok(PricedCart { lines, subtotal })
}
