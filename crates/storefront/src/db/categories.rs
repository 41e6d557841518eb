//! Category repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use fashion_store_core::CategoryId;

use super::{CategoryStore, RepositoryError};
use crate::models::Category;

#[derive(FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at FROM store.categories ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, description, created_at FROM store.categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, name: &str, description: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO store.categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            ",
        )
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// The reference check and the delete are one statement, so a category
    /// that gains a product concurrently is left in place.
    async fn delete_if_unreferenced(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let deleted = sqlx::query(
            r"
            DELETE FROM store.categories c
            WHERE c.id = $1
              AND NOT EXISTS (SELECT 1 FROM store.products p WHERE p.category_id = c.id)
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if deleted.rows_affected() > 0 {
            return Ok(());
        }

        match self.get(id).await? {
            Some(_) => Err(RepositoryError::Conflict(
                "category is referenced by products".to_owned(),
            )),
            None => Err(RepositoryError::NotFound),
        }
    }

    /// Number of categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM store.categories")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl CategoryStore for CategoryRepository<'_> {
    async fn count_products(&self, id: CategoryId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM store.products WHERE category_id = $1")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    async fn delete_unreferenced(&self, id: CategoryId) -> Result<(), RepositoryError> {
        self.delete_if_unreferenced(id).await
    }
}
