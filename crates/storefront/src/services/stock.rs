//! Back-office stock adjustments.
//!
//! Unlike the checkout decrement, every adjustment here is guarded: the new
//! level is computed from the current one and refused if it would be negative.
//! The read and the write are separate statements, so two concurrent
//! adjustments of the same counter are last-write-wins.

use thiserror::Error;

use fashion_store_core::{ProductId, StockAdjustError, StockOperation, stock};

use super::authz::{Forbidden, require_admin};
use crate::db::{CatalogStore, RepositoryError};
use crate::models::CurrentUser;

/// Errors from a stock adjustment.
#[derive(Debug, Error)]
pub enum AdjustError {
    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    #[error("product not found")]
    NotFound,

    /// Malformed input or an adjustment that would go negative. Nothing changed.
    #[error(transparent)]
    Rejected(#[from] StockAdjustError),

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AdjustError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// A raw adjustment request, as posted by the stock form.
#[derive(Debug, Clone, Copy)]
pub struct AdjustRequest<'r> {
    pub size: &'r str,
    pub action: &'r str,
    pub value: &'r str,
}

/// Applies guarded set/inc/dec operations to per-size counters.
pub struct StockAdjuster<'a> {
    catalog: &'a dyn CatalogStore,
}

impl<'a> StockAdjuster<'a> {
    #[must_use]
    pub const fn new(catalog: &'a dyn CatalogStore) -> Self {
        Self { catalog }
    }

    /// Adjust one counter and return its new level.
    ///
    /// Checks run in this order: admin, size tag, integer value, product
    /// exists, action tag, resulting level. A size the product does not yet
    /// track counts as zero.
    ///
    /// # Errors
    ///
    /// - [`AdjustError::Forbidden`] unless `actor` is an admin.
    /// - [`AdjustError::Rejected`] for bad input or a would-be negative level.
    /// - [`AdjustError::NotFound`] if the product does not exist.
    #[tracing::instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn adjust(
        &self,
        actor: &CurrentUser,
        product_id: ProductId,
        request: AdjustRequest<'_>,
    ) -> Result<i64, AdjustError> {
        require_admin(actor)?;

        let size = stock::parse_size(request.size)?;
        let value = stock::parse_value(request.value)?;

        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or(AdjustError::NotFound)?;

        let operation = StockOperation::parse(request.action)?;
        let current = product.stock.level(size);
        let next = operation.apply(current, value).inspect_err(|e| {
            tracing::info!(%size, current, error = %e, "stock adjustment rejected");
        })?;

        let level = match operation {
            StockOperation::Set => {
                self.catalog.set_stock(product_id, size, next).await?;
                next
            }
            StockOperation::Increment | StockOperation::Decrement => {
                self.catalog
                    .increment_stock(product_id, size, next - current)
                    .await?
            }
        };

        tracing::info!(
            %size,
            operation = operation.as_str(),
            previous = current,
            level,
            "stock adjusted"
        );
        Ok(level)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fashion_store_core::{Price, Size, UserId, UserRole};

    use super::*;
    use crate::db::memory::MemoryStore;

    fn admin() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            username: "admin".to_owned(),
            email: None,
            role: UserRole::Admin,
        }
    }

    fn request<'r>(size: &'r str, action: &'r str, value: &'r str) -> AdjustRequest<'r> {
        AdjustRequest {
            size,
            action,
            value,
        }
    }

    async fn store_with_tee() -> (MemoryStore, ProductId) {
        let store = MemoryStore::new();
        let id = store
            .add_product(
                "Tee",
                Price::ZERO,
                None,
                [(Size::S, 5), (Size::M, 0)].into_iter().collect(),
            )
            .await;
        (store, id)
    }

    #[tokio::test]
    async fn test_set_replaces_level() {
        let (store, id) = store_with_tee().await;
        let adjuster = StockAdjuster::new(&store);

        let level = adjuster.adjust(&admin(), id, request("S", "set", "12")).await.unwrap();

        assert_eq!(level, 12);
        assert_eq!(store.product(id).await.unwrap().stock.level(Size::S), 12);
    }

    #[tokio::test]
    async fn test_dec_past_zero_leaves_counter() {
        let (store, id) = store_with_tee().await;
        let adjuster = StockAdjuster::new(&store);

        let err = adjuster
            .adjust(&admin(), id, request("S", "dec", "6"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AdjustError::Rejected(StockAdjustError::WouldUnderflow { current: 5, .. })
        ));
        assert_eq!(store.product(id).await.unwrap().stock.level(Size::S), 5);
    }

    #[tokio::test]
    async fn test_untracked_size_starts_at_zero() {
        let (store, id) = store_with_tee().await;
        let adjuster = StockAdjuster::new(&store);

        let level = adjuster.adjust(&admin(), id, request("XL", "inc", "3")).await.unwrap();

        assert_eq!(level, 3);
        assert_eq!(store.product(id).await.unwrap().stock.get(Size::XL), Some(3));
    }

    #[tokio::test]
    async fn test_input_checked_before_product_lookup() {
        let store = MemoryStore::new();
        let adjuster = StockAdjuster::new(&store);
        let missing = ProductId::new(77);

        assert!(matches!(
            adjuster.adjust(&admin(), missing, request("XXL", "set", "1")).await,
            Err(AdjustError::Rejected(StockAdjustError::InvalidSize(_)))
        ));
        assert!(matches!(
            adjuster.adjust(&admin(), missing, request("S", "set", "two")).await,
            Err(AdjustError::Rejected(StockAdjustError::InvalidValue(_)))
        ));
        assert!(matches!(
            adjuster.adjust(&admin(), missing, request("S", "bogus", "1")).await,
            Err(AdjustError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_unknown_action_and_negative_values() {
        let (store, id) = store_with_tee().await;
        let adjuster = StockAdjuster::new(&store);

        assert!(matches!(
            adjuster.adjust(&admin(), id, request("S", "add", "1")).await,
            Err(AdjustError::Rejected(StockAdjustError::UnknownOperation(_)))
        ));
        for action in ["set", "inc", "dec"] {
            assert!(matches!(
                adjuster.adjust(&admin(), id, request("S", action, "-5")).await,
                Err(AdjustError::Rejected(StockAdjustError::InvalidValue(_)))
            ));
        }
        assert_eq!(store.product(id).await.unwrap().stock.level(Size::S), 5);
    }

    #[tokio::test]
    async fn test_negative_value_rejected_before_product_lookup() {
        let store = MemoryStore::new();
        let adjuster = StockAdjuster::new(&store);

        assert!(matches!(
            adjuster
                .adjust(&admin(), ProductId::new(77), request("M", "dec", "-5"))
                .await,
            Err(AdjustError::Rejected(StockAdjustError::InvalidValue(_)))
        ));
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let (store, id) = store_with_tee().await;
        let adjuster = StockAdjuster::new(&store);
        let shopper = CurrentUser {
            role: UserRole::User,
            ..admin()
        };

        assert!(matches!(
            adjuster.adjust(&shopper, id, request("S", "set", "1")).await,
            Err(AdjustError::Forbidden(_))
        ));
    }
}
