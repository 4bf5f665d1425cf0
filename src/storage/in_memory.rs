//! In-memory storage backend for testing and development
//!
//! Thread-safe via `RwLock`; the inventory check-and-decrement runs inside
//! a single write-lock critical section, which gives the same guarantee as
//! the database's atomic conditional update.

use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::core::entity::{Deletion, Entity};
use crate::core::error::{ApiError, ApiResult};
use crate::domain::{Order, Product, User};
use crate::storage::repository::{
    InventoryLedger, OrderRepository, ProductRepository, UserRepository,
};

/// In-memory user store
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn create(&self, user: User) -> ApiResult<User> {
        let mut users = self
            .users
            .write()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire write lock: {}", e)))?;

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: &Uuid) -> ApiResult<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire read lock: {}", e)))?;

        Ok(users.get(id).filter(|u| !u.is_deleted()).cloned())
    }
}

/// In-memory product store; also the in-memory inventory ledger
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductStore {
    async fn create(&self, product: Product) -> ApiResult<Product> {
        let mut products = self
            .products
            .write()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire write lock: {}", e)))?;

        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get(&self, id: &Uuid) -> ApiResult<Option<Product>> {
        let products = self
            .products
            .read()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire read lock: {}", e)))?;

        Ok(products.get(id).filter(|p| !p.is_deleted()).cloned())
    }

    async fn list(&self) -> ApiResult<Vec<Product>> {
        let products = self
            .products
            .read()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire read lock: {}", e)))?;

        Ok(products
            .values()
            .filter(|p| !p.is_deleted())
            .cloned()
            .collect())
    }

    async fn update(&self, product: Product) -> ApiResult<Product> {
        let mut products = self
            .products
            .write()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire write lock: {}", e)))?;

        let existing = products.get_mut(&product.id).ok_or(ApiError::NotFound {
            resource: "product",
            id: product.id,
        })?;

        // Quantity belongs to the ledger; carry the stored value forward
        let mut product = product;
        product.quantity = existing.quantity;
        *existing = product.clone();
        Ok(product)
    }

    async fn soft_delete(&self, id: &Uuid) -> ApiResult<()> {
        let mut products = self
            .products
            .write()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire write lock: {}", e)))?;

        let product = products
            .get_mut(id)
            .filter(|p| !p.is_deleted())
            .ok_or(ApiError::NotFound {
                resource: "product",
                id: *id,
            })?;

        product.deletion = Deletion::now();
        product.touch();
        Ok(())
    }
}

#[async_trait]
impl InventoryLedger for InMemoryProductStore {
    async fn reserve(&self, product_id: &Uuid, quantity: i64) -> ApiResult<()> {
        let mut products = self
            .products
            .write()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire write lock: {}", e)))?;

        let product = products
            .get_mut(product_id)
            .filter(|p| !p.is_deleted())
            .ok_or(ApiError::NotFound {
                resource: "product",
                id: *product_id,
            })?;

        if !product.tracks_stock() {
            return Ok(());
        }

        // Check and decrement under the same write lock
        let available = product.quantity.unwrap_or(0);
        if available < quantity {
            return Err(ApiError::InsufficientStock {
                product_id: *product_id,
                requested: quantity,
                available,
            });
        }

        product.quantity = Some(available - quantity);
        product.touch();
        Ok(())
    }

    async fn release(&self, product_id: &Uuid, quantity: i64) -> ApiResult<()> {
        let mut products = self
            .products
            .write()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire write lock: {}", e)))?;

        let product = products
            .get_mut(product_id)
            .filter(|p| !p.is_deleted())
            .ok_or(ApiError::NotFound {
                resource: "product",
                id: *product_id,
            })?;

        if !product.tracks_stock() {
            return Ok(());
        }

        product.quantity = Some(product.quantity.unwrap_or(0) + quantity);
        product.touch();
        Ok(())
    }
}

/// In-memory order store
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderStore {
    async fn create(&self, order: Order) -> ApiResult<Order> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire write lock: {}", e)))?;

        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: &Uuid) -> ApiResult<Option<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire read lock: {}", e)))?;

        Ok(orders.get(id).filter(|o| !o.is_deleted()).cloned())
    }

    async fn list_by_user(&self, user_id: &Uuid) -> ApiResult<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire read lock: {}", e)))?;

        Ok(orders
            .values()
            .filter(|o| &o.user_id == user_id && !o.is_deleted())
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> ApiResult<Vec<Order>> {
        let orders = self
            .orders
            .read()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire read lock: {}", e)))?;

        Ok(orders.values().filter(|o| !o.is_deleted()).cloned().collect())
    }

    async fn update(&self, order: Order) -> ApiResult<Order> {
        let mut orders = self
            .orders
            .write()
            .map_err(|e| ApiError::Unexpected(anyhow!("failed to acquire write lock: {}", e)))?;

        if !orders.contains_key(&order.id) {
            return Err(ApiError::NotFound {
                resource: "order",
                id: order.id,
            });
        }

        orders.insert(order.id, order.clone());
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // === Products and soft delete ===

    #[tokio::test]
    async fn test_get_filters_soft_deleted_product() {
        let store = InMemoryProductStore::new();
        let product = Product::new("Yoga mat", Some(dec!(89.90)), Some(10));
        let id = product.id;

        store.create(product).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_some());

        store.soft_delete(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_does_not_touch_quantity() {
        let store = InMemoryProductStore::new();
        let product = Product::new("Yoga mat", Some(dec!(89.90)), Some(10));
        let id = product.id;
        store.create(product.clone()).await.unwrap();

        let mut changed = product;
        changed.name = "Pro yoga mat".to_string();
        changed.quantity = Some(999);
        store.update(changed).await.unwrap();

        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Pro yoga mat");
        assert_eq!(stored.quantity, Some(10));
    }

    // === Inventory ledger ===

    #[tokio::test]
    async fn test_reserve_decrements() {
        let store = InMemoryProductStore::new();
        let product = Product::new("Yoga mat", Some(dec!(89.90)), Some(10));
        let id = product.id;
        store.create(product).await.unwrap();

        store.reserve(&id, 3).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().unwrap().quantity, Some(7));
    }

    #[tokio::test]
    async fn test_reserve_fails_below_floor() {
        let store = InMemoryProductStore::new();
        let product = Product::new("Yoga mat", Some(dec!(89.90)), Some(2));
        let id = product.id;
        store.create(product).await.unwrap();

        let err = store.reserve(&id, 5).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::InsufficientStock {
                requested: 5,
                available: 2,
                ..
            }
        ));
        // Nothing was decremented
        assert_eq!(store.get(&id).await.unwrap().unwrap().quantity, Some(2));
    }

    #[tokio::test]
    async fn test_reserve_missing_product_is_not_found() {
        let store = InMemoryProductStore::new();
        let err = store.reserve(&Uuid::new_v4(), 1).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unlimited_product_is_exempt() {
        let store = InMemoryProductStore::new();
        let product = Product::new("Meditation course", Some(dec!(49.00)), None);
        let id = product.id;
        store.create(product).await.unwrap();

        store.reserve(&id, 100).await.unwrap();
        store.release(&id, 100).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().unwrap().quantity, None);
    }

    #[tokio::test]
    async fn test_release_increments() {
        let store = InMemoryProductStore::new();
        let product = Product::new("Yoga mat", Some(dec!(89.90)), Some(2));
        let id = product.id;
        store.create(product).await.unwrap();

        store.release(&id, 3).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().unwrap().quantity, Some(5));
    }

    #[tokio::test]
    async fn test_concurrent_reservations_of_last_unit() {
        let store = InMemoryProductStore::new();
        let product = Product::new("Yoga mat", Some(dec!(89.90)), Some(1));
        let id = product.id;
        store.create(product).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.reserve(&id, 1).await }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        // Exactly one reservation wins the last unit
        assert_eq!(successes, 1);
        assert_eq!(store.get(&id).await.unwrap().unwrap().quantity, Some(0));
    }

    // === Orders ===

    #[tokio::test]
    async fn test_order_round_trip_and_deletion_filter() {
        let store = InMemoryOrderStore::new();
        let user_id = Uuid::new_v4();
        let order = Order::new(user_id, vec![], dec!(0), dec!(0));
        let id = order.id;

        store.create(order.clone()).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_some());
        assert_eq!(store.list_by_user(&user_id).await.unwrap().len(), 1);

        let mut deleted = order;
        deleted.deletion = Deletion::now();
        store.update(deleted).await.unwrap();

        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.list_by_user(&user_id).await.unwrap().is_empty());
    }
}
