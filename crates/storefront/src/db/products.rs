//! Product repository.
//!
//! Stock counters live in the `stock` JSONB column, keyed by size tag. The
//! counter updates are single `UPDATE` statements built on `jsonb_set`, so a
//! concurrent checkout can interleave with them but never loses a write
//! inside one statement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use fashion_store_core::{CategoryId, Price, ProductId, Size, StockLevels};

use super::{CatalogStore, RepositoryError};
use crate::models::{Product, ProductDraft, ProductFilter, ProductImage};

const PRODUCT_COLUMNS: &str = "id, name, description, price, category_id, colors, stock, images, featured, created_at";

#[derive(FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    category_id: Option<CategoryId>,
    colors: Vec<String>,
    stock: Json<StockLevels>,
    images: Json<Vec<ProductImage>>,
    featured: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category_id: row.category_id,
            colors: row.colors,
            stock: row.stock.0,
            images: row.images.0,
            featured: row.featured,
            created_at: row.created_at,
        }
    }
}

/// Escape `LIKE` wildcards so a search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// List products matching every filter that is set, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products WHERE TRUE"
        ));

        if let Some(category) = filter.category {
            query.push(" AND category_id = ").push_bind(category);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", escape_like(search));
            query
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(min_price) = filter.min_price {
            query.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = filter.max_price {
            query.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(size) = filter.size {
            query
                .push(" AND COALESCE((stock->>")
                .push_bind(size.as_str())
                .push(")::bigint, 0) > 0");
        }
        if let Some(color) = filter.color.as_deref().filter(|c| !c.is_empty()) {
            query
                .push(" AND ")
                .push_bind(color.to_owned())
                .push(" = ANY(colors)");
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Featured products for the home page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products
             WHERE featured ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Other products in the same category as `product`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(
        &self,
        product: &Product,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let Some(category_id) = product.category_id else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.products
             WHERE category_id = $1 AND id <> $2
             ORDER BY created_at DESC, id DESC LIMIT $3"
        ))
        .bind(category_id)
        .bind(product.id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Total number of products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM store.products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a product with the given images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        draft: &ProductDraft,
        images: &[ProductImage],
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO store.products
                 (name, description, price, category_id, colors, stock, images, featured)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.category_id)
        .bind(&draft.colors)
        .bind(Json(&draft.stock))
        .bind(Json(images))
        .bind(draft.featured)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Overwrite the editable fields of a product. Images are kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE store.products
             SET name = $2, description = $3, price = $4, category_id = $5,
                 colors = $6, stock = $7, featured = $8
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.category_id)
        .bind(&draft.colors)
        .bind(Json(&draft.stock))
        .bind(draft.featured)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Append images to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn append_images(
        &self,
        id: ProductId,
        images: &[ProductImage],
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE store.products SET images = images || $2
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(images))
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product, returning the removed record so its files can be cleaned up.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "DELETE FROM store.products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }
}

#[async_trait]
impl CatalogStore for ProductRepository<'_> {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.get(id).await
    }

    async fn decrement_stock(
        &self,
        id: ProductId,
        size: Size,
        quantity: i64,
    ) -> Result<bool, RepositoryError> {
        let tracked: Option<bool> = sqlx::query_scalar(
            r"
            WITH target AS (
                SELECT id, stock ? $2 AS tracked FROM store.products WHERE id = $1
            ), updated AS (
                UPDATE store.products p
                SET stock = jsonb_set(p.stock, ARRAY[$2::text], to_jsonb((p.stock->>$2)::bigint - $3))
                FROM target
                WHERE p.id = target.id AND target.tracked
                RETURNING p.id
            )
            SELECT tracked FROM target
            ",
        )
        .bind(id)
        .bind(size.as_str())
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        tracked.ok_or(RepositoryError::NotFound)
    }

    async fn set_stock(
        &self,
        id: ProductId,
        size: Size,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE store.products
            SET stock = jsonb_set(stock, ARRAY[$2::text], to_jsonb($3::bigint), true)
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(size.as_str())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn increment_stock(
        &self,
        id: ProductId,
        size: Size,
        delta: i64,
    ) -> Result<i64, RepositoryError> {
        let level: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE store.products
            SET stock = jsonb_set(
                stock,
                ARRAY[$2::text],
                to_jsonb(COALESCE((stock->>$2)::bigint, 0) + $3::bigint),
                true
            )
            WHERE id = $1
            RETURNING (stock->>$2)::bigint
            ",
        )
        .bind(id)
        .bind(size.as_str())
        .bind(delta)
        .fetch_optional(self.pool)
        .await?;

        level.ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("kurta"), "kurta");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }
}
