//! Repository and ledger traits
//!
//! Storage is injected into services as trait objects; nothing in the
//! domain layer touches a concrete backend. Reads filter out soft-deleted
//! rows at the query boundary, so callers never re-check deletion state.

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::ApiResult;
use crate::domain::{Order, Product, User};

/// User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> ApiResult<User>;

    /// Get a user by id; soft-deleted users are not returned
    async fn get(&self, id: &Uuid) -> ApiResult<Option<User>>;
}

/// Product catalog persistence
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> ApiResult<Product>;

    /// Get a product by id; soft-deleted products are not returned
    async fn get(&self, id: &Uuid) -> ApiResult<Option<Product>>;

    async fn list(&self) -> ApiResult<Vec<Product>>;

    /// Persist an updated product. Quantity is owned by the
    /// [`InventoryLedger`]; callers must not write it through this method.
    async fn update(&self, product: Product) -> ApiResult<Product>;

    async fn soft_delete(&self, id: &Uuid) -> ApiResult<()>;
}

/// Atomic inventory operations.
///
/// `reserve` and `release` are the only paths that mutate
/// `Product::quantity`. Both must be atomic per product: two concurrent
/// reservations of the last unit must not both succeed. Products with an
/// external URL or unlimited quantity are exempt — both operations succeed
/// without touching anything.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Decrement available quantity if at least `quantity` is available,
    /// else fail with the insufficient-stock error.
    async fn reserve(&self, product_id: &Uuid, quantity: i64) -> ApiResult<()>;

    /// Increment available quantity (compensating action / restock)
    async fn release(&self, product_id: &Uuid, quantity: i64) -> ApiResult<()>;
}

/// Order persistence
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist an order and its items as one durable unit
    async fn create(&self, order: Order) -> ApiResult<Order>;

    /// Get an order by id; soft-deleted orders are not returned
    async fn get(&self, id: &Uuid) -> ApiResult<Option<Order>>;

    async fn list_by_user(&self, user_id: &Uuid) -> ApiResult<Vec<Order>>;

    async fn list_all(&self) -> ApiResult<Vec<Order>>;

    /// Persist an updated order (including its soft-delete marker).
    /// Looks the order up by id without the deletion filter, so the final
    /// state of a delete can itself be stored.
    async fn update(&self, order: Order) -> ApiResult<Order>;
}
