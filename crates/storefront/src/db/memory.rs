//! In-memory store implementations for service-level tests.
//!
//! One [`MemoryStore`] implements every store trait over plain maps, so a
//! test can seed products and users, run a checkout, and inspect the result.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use fashion_store_core::{
    CategoryId, Email, OrderId, OrderStatus, Price, ProductId, Size, StockLevels, UserId, UserRole,
};

use super::{CatalogStore, CategoryStore, OrderStore, RepositoryError, UserDirectory};
use crate::models::{Category, NewOrder, Order, Product, User};

#[derive(Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    categories: BTreeMap<CategoryId, Category>,
    orders: BTreeMap<OrderId, Order>,
    users: BTreeMap<UserId, User>,
    next_id: i32,
}

impl Tables {
    const fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// A whole store held in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product with the given price and stock; everything else is blank.
    pub async fn add_product(
        &self,
        name: &str,
        price: Price,
        category_id: Option<CategoryId>,
        stock: StockLevels,
    ) -> ProductId {
        let mut tables = self.tables.lock().await;
        let id = ProductId::new(tables.next_id());
        tables.products.insert(
            id,
            Product {
                id,
                name: name.to_owned(),
                description: String::new(),
                price,
                category_id,
                colors: Vec::new(),
                stock,
                images: Vec::new(),
                featured: false,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub async fn add_category(&self, name: &str) -> CategoryId {
        let mut tables = self.tables.lock().await;
        let id = CategoryId::new(tables.next_id());
        tables.categories.insert(
            id,
            Category {
                id,
                name: name.to_owned(),
                description: String::new(),
                created_at: Utc::now(),
            },
        );
        id
    }

    pub async fn add_user(&self, username: &str, email: Option<Email>, role: UserRole) -> User {
        let mut tables = self.tables.lock().await;
        let id = UserId::new(tables.next_id());
        let user = User {
            id,
            username: username.to_owned(),
            email,
            role,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        user
    }

    /// Snapshot of a product.
    pub async fn product(&self, id: ProductId) -> Option<Product> {
        self.tables.lock().await.products.get(&id).cloned()
    }

    /// Apply an arbitrary change to a stored product (price edits, deletion of sizes).
    pub async fn edit_product(&self, id: ProductId, edit: impl FnOnce(&mut Product) + Send) {
        if let Some(product) = self.tables.lock().await.products.get_mut(&id) {
            edit(product);
        }
    }

    pub async fn remove_product(&self, id: ProductId) -> Option<Product> {
        self.tables.lock().await.products.remove(&id)
    }

    pub async fn category(&self, id: CategoryId) -> Option<Category> {
        self.tables.lock().await.categories.get(&id).cloned()
    }

    /// Every stored order, oldest first.
    pub async fn orders(&self) -> Vec<Order> {
        self.tables.lock().await.orders.values().cloned().collect()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.product(id).await)
    }

    async fn decrement_stock(
        &self,
        id: ProductId,
        size: Size,
        quantity: i64,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(product.stock.decrement_unchecked(size, quantity))
    }

    async fn set_stock(
        &self,
        id: ProductId,
        size: Size,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        product.stock.set(size, quantity);
        Ok(())
    }

    async fn increment_stock(
        &self,
        id: ProductId,
        size: Size,
        delta: i64,
    ) -> Result<i64, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        let level = product.stock.level(size) + delta;
        product.stock.set(size, level);
        Ok(level)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let id = OrderId::new(tables.next_id());
        let order = Order {
            id,
            user_id: order.user_id,
            items: order.items,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            total_amount: order.total_amount,
            status: OrderStatus::pending(),
            created_at: Utc::now(),
        };
        tables.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.lock().await.orders.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.orders.get_mut(&id).map(|order| {
            order.status = status.clone();
            order.clone()
        }))
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn count_products(&self, id: CategoryId) -> Result<i64, RepositoryError> {
        let tables = self.tables.lock().await;
        let count = tables
            .products
            .values()
            .filter(|product| product.category_id == Some(id))
            .count();
        i64::try_from(count).map_err(|e| RepositoryError::DataCorruption(e.to_string()))
    }

    async fn delete_unreferenced(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.categories.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if tables
            .products
            .values()
            .any(|product| product.category_id == Some(id))
        {
            return Err(RepositoryError::Conflict(
                "category is referenced by products".to_owned(),
            ));
        }
        tables.categories.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_decrement_untracked_size_is_noop() {
        let store = MemoryStore::new();
        let id = store
            .add_product("Tee", Price::ZERO, None, [(Size::S, 1)].into_iter().collect())
            .await;

        assert!(!store.decrement_stock(id, Size::XL, 1).await.unwrap());
        assert_eq!(store.product(id).await.unwrap().stock.get(Size::XL), None);
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.decrement_stock(ProductId::new(99), Size::S, 1).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            store.set_stock(ProductId::new(99), Size::S, 1).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
