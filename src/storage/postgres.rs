//! PostgreSQL storage backend using sqlx.
//!
//! The inventory ledger here relies on the database's atomic conditional
//! update: `UPDATE .. SET quantity = quantity - $n WHERE .. AND quantity
//! >= $n`. Zero affected rows means the floor check failed (or the product
//! is exempt/absent, classified by a follow-up read). Order creation writes
//! the order and its items inside one transaction.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! wellmarket = { version = "0.1", features = ["postgres"] }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::core::error::{ApiError, ApiResult, ConflictError};
use crate::domain::{
    Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, Product, ProductStatus, User,
    UserStatus,
};
use crate::storage::repository::{
    InventoryLedger, OrderRepository, ProductRepository, UserRepository,
};

/// Connect to PostgreSQL
pub async fn connect(database_url: &str) -> ApiResult<PgPool> {
    Ok(PgPool::connect(database_url).await?)
}

/// Run the embedded migrations
pub async fn migrate(pool: &PgPool) -> ApiResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| ApiError::Unexpected(anyhow::Error::new(e)))
}

// =============================================================================
// Enum <-> column mapping
// =============================================================================

fn user_status_to_str(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Active => "active",
        UserStatus::Inactive => "inactive",
    }
}

fn user_status_from_str(s: &str) -> ApiResult<UserStatus> {
    match s {
        "active" => Ok(UserStatus::Active),
        "inactive" => Ok(UserStatus::Inactive),
        other => Err(ApiError::Unexpected(anyhow::anyhow!(
            "unknown user status '{}'",
            other
        ))),
    }
}

fn product_status_to_str(status: ProductStatus) -> &'static str {
    match status {
        ProductStatus::Active => "active",
        ProductStatus::Inactive => "inactive",
        ProductStatus::OutOfStock => "out_of_stock",
    }
}

fn product_status_from_str(s: &str) -> ApiResult<ProductStatus> {
    match s {
        "active" => Ok(ProductStatus::Active),
        "inactive" => Ok(ProductStatus::Inactive),
        "out_of_stock" => Ok(ProductStatus::OutOfStock),
        other => Err(ApiError::Unexpected(anyhow::anyhow!(
            "unknown product status '{}'",
            other
        ))),
    }
}

fn payment_method_to_str(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::CreditCard => "credit_card",
        PaymentMethod::DebitCard => "debit_card",
        PaymentMethod::Pix => "pix",
        PaymentMethod::BankSlip => "bank_slip",
    }
}

fn payment_method_from_str(s: &str) -> ApiResult<PaymentMethod> {
    match s {
        "credit_card" => Ok(PaymentMethod::CreditCard),
        "debit_card" => Ok(PaymentMethod::DebitCard),
        "pix" => Ok(PaymentMethod::Pix),
        "bank_slip" => Ok(PaymentMethod::BankSlip),
        other => Err(ApiError::Unexpected(anyhow::anyhow!(
            "unknown payment method '{}'",
            other
        ))),
    }
}

fn payment_status_to_str(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Paid => "paid",
        PaymentStatus::Refused => "refused",
        PaymentStatus::Refunded => "refunded",
    }
}

fn payment_status_from_str(s: &str) -> ApiResult<PaymentStatus> {
    match s {
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        "refused" => Ok(PaymentStatus::Refused),
        "refunded" => Ok(PaymentStatus::Refunded),
        other => Err(ApiError::Unexpected(anyhow::anyhow!(
            "unknown payment status '{}'",
            other
        ))),
    }
}

fn order_status_from_str(s: &str) -> ApiResult<OrderStatus> {
    match s {
        "pending" => Ok(OrderStatus::Pending),
        "completed" => Ok(OrderStatus::Completed),
        "cancelled" => Ok(OrderStatus::Cancelled),
        other => Err(ApiError::Unexpected(anyhow::anyhow!(
            "unknown order status '{}'",
            other
        ))),
    }
}

// =============================================================================
// Users
// =============================================================================

/// User store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> ApiResult<User> {
    let status: String = row.try_get("status")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        status: user_status_from_str(&status)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deletion: row.try_get::<Option<DateTime<Utc>>, _>("deleted_at")?.into(),
    })
}

#[async_trait]
impl UserRepository for PgUserStore {
    async fn create(&self, user: User) -> ApiResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (id, name, email, status, created_at, updated_at, deleted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user_status_to_str(user.status))
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.deletion.deleted_at())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
                Err(ApiError::Conflict(ConflictError::Duplicate {
                    resource: "user",
                    field: "email",
                }))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: &Uuid) -> ApiResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }
}

// =============================================================================
// Products + inventory ledger
// =============================================================================

/// Product store backed by PostgreSQL; also the inventory ledger
#[derive(Clone, Debug)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Classify a zero-row conditional update: absent, exempt, or short
    async fn classify_failed_mutation(
        &self,
        product_id: &Uuid,
        requested: i64,
    ) -> ApiResult<()> {
        let row = sqlx::query(
            "SELECT quantity, external_url FROM products \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(ApiError::NotFound {
                resource: "product",
                id: *product_id,
            });
        };

        let quantity: Option<i64> = row.try_get("quantity")?;
        let external_url: Option<String> = row.try_get("external_url")?;

        if external_url.is_some() || quantity.is_none() {
            // Exempt from stock management
            return Ok(());
        }

        Err(ApiError::InsufficientStock {
            product_id: *product_id,
            requested,
            available: quantity.unwrap_or(0),
        })
    }
}

fn product_from_row(row: &PgRow) -> ApiResult<Product> {
    let status: String = row.try_get("status")?;
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get::<Option<Decimal>, _>("price")?,
        quantity: row.try_get::<Option<i64>, _>("quantity")?,
        status: product_status_from_str(&status)?,
        external_url: row.try_get("external_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deletion: row.try_get::<Option<DateTime<Utc>>, _>("deleted_at")?.into(),
    })
}

#[async_trait]
impl ProductRepository for PgProductStore {
    async fn create(&self, product: Product) -> ApiResult<Product> {
        sqlx::query(
            "INSERT INTO products \
             (id, name, description, price, quantity, status, external_url, \
              created_at, updated_at, deleted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product_status_to_str(product.status))
        .bind(&product.external_url)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.deletion.deleted_at())
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    async fn get(&self, id: &Uuid) -> ApiResult<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn list(&self) -> ApiResult<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT * FROM products WHERE deleted_at IS NULL ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn update(&self, product: Product) -> ApiResult<Product> {
        // Quantity is deliberately absent: it is owned by the ledger
        let result = sqlx::query(
            "UPDATE products \
             SET name = $2, description = $3, price = $4, status = $5, \
                 external_url = $6, updated_at = $7 \
             WHERE id = $1",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product_status_to_str(product.status))
        .bind(&product.external_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: "product",
                id: product.id,
            });
        }

        self.get(&product.id).await?.ok_or(ApiError::NotFound {
            resource: "product",
            id: product.id,
        })
    }

    async fn soft_delete(&self, id: &Uuid) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = $2, updated_at = $2 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: "product",
                id: *id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryLedger for PgProductStore {
    async fn reserve(&self, product_id: &Uuid, quantity: i64) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE products \
             SET quantity = quantity - $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND external_url IS NULL \
               AND quantity IS NOT NULL AND quantity >= $2",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        self.classify_failed_mutation(product_id, quantity).await
    }

    async fn release(&self, product_id: &Uuid, quantity: i64) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE products \
             SET quantity = quantity + $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL AND external_url IS NULL \
               AND quantity IS NOT NULL",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Absent -> not found; exempt -> fine
        match self.classify_failed_mutation(product_id, quantity).await {
            Err(ApiError::InsufficientStock { .. }) => Ok(()),
            other => other,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Order store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, order_id: &Uuid) -> ApiResult<Vec<OrderItem>> {
        let rows = sqlx::query("SELECT * FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(OrderItem {
                    id: row.try_get("id")?,
                    product_id: row.try_get("product_id")?,
                    product_name: row.try_get("product_name")?,
                    quantity: row.try_get("quantity")?,
                    unit_price: row.try_get("unit_price")?,
                    discount: row.try_get("discount")?,
                    total: row.try_get("total")?,
                })
            })
            .collect()
    }

    async fn hydrate(&self, row: &PgRow) -> ApiResult<Order> {
        let id: Uuid = row.try_get("id")?;
        let status: String = row.try_get("status")?;
        let payment_method: Option<String> = row.try_get("payment_method")?;
        let payment_status: Option<String> = row.try_get("payment_status")?;

        Ok(Order {
            id,
            user_id: row.try_get("user_id")?,
            status: order_status_from_str(&status)?,
            items: self.load_items(&id).await?,
            subtotal: row.try_get("subtotal")?,
            shipping_cost: row.try_get("shipping_cost")?,
            tax: row.try_get("tax")?,
            total: row.try_get("total")?,
            payment_method: payment_method
                .as_deref()
                .map(payment_method_from_str)
                .transpose()?,
            payment_status: payment_status
                .as_deref()
                .map(payment_status_from_str)
                .transpose()?,
            transaction_id: row.try_get("transaction_id")?,
            tracking_number: row.try_get("tracking_number")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deletion: row.try_get::<Option<DateTime<Utc>>, _>("deleted_at")?.into(),
        })
    }
}

#[async_trait]
impl OrderRepository for PgOrderStore {
    async fn create(&self, order: Order) -> ApiResult<Order> {
        // Order and items are one durable unit
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders \
             (id, user_id, status, subtotal, shipping_cost, tax, total, \
              payment_method, payment_status, transaction_id, tracking_number, \
              created_at, updated_at, deleted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.status.as_str())
        .bind(order.subtotal)
        .bind(order.shipping_cost)
        .bind(order.tax)
        .bind(order.total)
        .bind(order.payment_method.map(payment_method_to_str))
        .bind(order.payment_status.map(payment_status_to_str))
        .bind(&order.transaction_id)
        .bind(&order.tracking_number)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.deletion.deleted_at())
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items \
                 (id, order_id, product_id, product_name, quantity, unit_price, \
                  discount, total) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(item.id)
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.discount)
            .bind(item.total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    async fn get(&self, id: &Uuid) -> ApiResult<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: &Uuid) -> ApiResult<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT * FROM orders WHERE user_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(self.hydrate(row).await?);
        }
        Ok(orders)
    }

    async fn list_all(&self) -> ApiResult<Vec<Order>> {
        let rows =
            sqlx::query("SELECT * FROM orders WHERE deleted_at IS NULL ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(self.hydrate(row).await?);
        }
        Ok(orders)
    }

    async fn update(&self, order: Order) -> ApiResult<Order> {
        // Items are immutable after creation; only order-level fields change
        let result = sqlx::query(
            "UPDATE orders \
             SET status = $2, subtotal = $3, shipping_cost = $4, tax = $5, total = $6, \
                 payment_method = $7, payment_status = $8, transaction_id = $9, \
                 tracking_number = $10, updated_at = $11, deleted_at = $12 \
             WHERE id = $1",
        )
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.subtotal)
        .bind(order.shipping_cost)
        .bind(order.tax)
        .bind(order.total)
        .bind(order.payment_method.map(payment_method_to_str))
        .bind(order.payment_status.map(payment_status_to_str))
        .bind(&order.transaction_id)
        .bind(&order.tracking_number)
        .bind(order.updated_at)
        .bind(order.deletion.deleted_at())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: "order",
                id: order.id,
            });
        }

        Ok(order)
    }
}
