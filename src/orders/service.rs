//! Order lifecycle orchestration
//!
//! Create runs validation -> reservation -> payment -> persistence, with
//! compensating inventory release whenever a later step fails: the caller
//! either gets a persisted order or the exact pre-call stock levels. The
//! database-level atomic reserve is the only concurrency control; this
//! service performs no locking of its own.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::auth::AuthContext;
use crate::core::error::{
    ApiError, ApiResult, AuthError, ConflictError, PaymentError, ValidationError,
};
use crate::core::money;
use crate::domain::cart::{CartItemRequest, CartValidation};
use crate::domain::order::{
    BillingAddress, CardData, Order, OrderStatus, PaymentMethod, PaymentStatus,
};
use crate::orders::builder;
use crate::orders::validator::CartValidator;
use crate::payment::{ChargeRequest, ChargeStatus, PaymentGateway, RevenueSplit};
use crate::storage::repository::{InventoryLedger, OrderRepository, UserRepository};

/// Input for order creation
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub items: Vec<CartItemRequest>,
    pub payment_method: PaymentMethod,
    pub card_data: Option<CardData>,
    pub billing_address: Option<BillingAddress>,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
}

/// Input for order updates; stock is never re-validated here
#[derive(Debug, Clone, Default)]
pub struct UpdateOrderInput {
    pub status: Option<OrderStatus>,
    pub shipping_cost: Option<Decimal>,
    pub tracking_number: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

/// Orchestrates the order lifecycle over injected collaborators
pub struct OrderService {
    users: Arc<dyn UserRepository>,
    orders: Arc<dyn OrderRepository>,
    ledger: Arc<dyn InventoryLedger>,
    gateway: Arc<dyn PaymentGateway>,
    validator: CartValidator,
    split: Option<RevenueSplit>,
}

impl OrderService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        orders: Arc<dyn OrderRepository>,
        ledger: Arc<dyn InventoryLedger>,
        gateway: Arc<dyn PaymentGateway>,
        validator: CartValidator,
        split: Option<RevenueSplit>,
    ) -> Self {
        Self {
            users,
            orders,
            ledger,
            gateway,
            validator,
            split,
        }
    }

    /// Dry-run cart classification; no side effects
    pub async fn validate_cart(&self, items: &[CartItemRequest]) -> ApiResult<CartValidation> {
        self.validator.validate(items).await
    }

    /// Create an order for the authenticated user.
    ///
    /// All-or-nothing: if any item fails classification the whole request
    /// is rejected before any reservation; if any reservation or the
    /// charge fails, every reservation made for this attempt is released
    /// before the error propagates.
    pub async fn create_order(&self, user_id: Uuid, input: CreateOrderInput) -> ApiResult<Order> {
        if input.items.is_empty() {
            return Err(ValidationError::MissingField { field: "items" }.into());
        }
        if input.shipping_cost < Decimal::ZERO {
            return Err(ValidationError::InvalidField {
                field: "shipping_cost",
                message: "must not be negative".to_string(),
            }
            .into());
        }
        if input.tax < Decimal::ZERO {
            return Err(ValidationError::InvalidField {
                field: "tax",
                message: "must not be negative".to_string(),
            }
            .into());
        }

        let user = self
            .users
            .get(&user_id)
            .await?
            .ok_or(ApiError::NotFound {
                resource: "user",
                id: user_id,
            })?;
        if !user.is_active() {
            return Err(ValidationError::InvalidField {
                field: "user_id",
                message: "user is not active".to_string(),
            }
            .into());
        }

        if input.payment_method.requires_card() {
            if input.card_data.is_none() {
                return Err(ValidationError::MissingField { field: "card_data" }.into());
            }
            if input.billing_address.is_none() {
                return Err(ValidationError::MissingField {
                    field: "billing_address",
                }
                .into());
            }
        }

        // Classify first; a single bad item rejects the whole order
        let validation = self.validator.validate(&input.items).await?;
        if !validation.is_fully_valid() {
            return Err(ValidationError::InvalidCart {
                items: validation.invalid_items,
            }
            .into());
        }

        // Reserve all-or-nothing
        let mut reserved: Vec<(Uuid, i64)> = Vec::with_capacity(validation.valid_items.len());
        for item in &validation.valid_items {
            match self.ledger.reserve(&item.product_id, item.quantity).await {
                Ok(()) => reserved.push((item.product_id, item.quantity)),
                Err(err) => {
                    self.release_all(&reserved).await;
                    return Err(err);
                }
            }
        }

        let items = builder::build_items(&validation.valid_items);
        let mut order = Order::new(user_id, items, input.shipping_cost, input.tax);
        order.payment_method = Some(input.payment_method);

        let charge_amount = money::gateway_amount(order.total);
        let charge = ChargeRequest {
            order_id: order.id,
            amount: charge_amount,
            method: input.payment_method,
            card: input.card_data,
            billing_address: input.billing_address,
            split: self.split.clone(),
        };

        let outcome = match self.gateway.charge(charge).await {
            Ok(outcome) if outcome.status == ChargeStatus::Approved => outcome,
            Ok(_) => {
                self.release_all(&reserved).await;
                return Err(PaymentError::Declined {
                    message: "charge was declined by the gateway".to_string(),
                }
                .into());
            }
            Err(err) => {
                self.release_all(&reserved).await;
                return Err(err);
            }
        };

        order.payment_status = Some(PaymentStatus::Paid);
        order.transaction_id = Some(outcome.transaction_id.clone());

        match self.orders.create(order).await {
            Ok(order) => {
                tracing::info!(order_id = %order.id, user_id = %user_id, total = %order.total, "order created");
                Ok(order)
            }
            Err(err) => {
                // Persistence failed after the charge settled: give the
                // money and the stock back before surfacing the error
                self.release_all(&reserved).await;
                if let Err(refund_err) = self
                    .gateway
                    .refund(&outcome.transaction_id, charge_amount)
                    .await
                {
                    tracing::error!(
                        transaction_id = %outcome.transaction_id,
                        error = %refund_err,
                        "failed to refund charge after persistence failure"
                    );
                }
                Err(err)
            }
        }
    }

    /// Get an order, enforcing ownership.
    ///
    /// A non-owner gets 403, distinct from 404 for an absent order.
    pub async fn get_order(&self, ctx: &AuthContext, id: &Uuid) -> ApiResult<Order> {
        ctx.require_user()?;

        let order = self.orders.get(id).await?.ok_or(ApiError::NotFound {
            resource: "order",
            id: *id,
        })?;

        if !ctx.can_access(&order.user_id) {
            return Err(AuthError::NotOwner {
                resource: "order",
                id: *id,
            }
            .into());
        }

        Ok(order)
    }

    /// List the caller's orders; admins see all orders
    pub async fn list_orders(&self, ctx: &AuthContext) -> ApiResult<Vec<Order>> {
        let user_id = ctx.require_user()?;
        if ctx.is_admin() {
            self.orders.list_all().await
        } else {
            self.orders.list_by_user(&user_id).await
        }
    }

    /// Update status, shipping cost or tracking; never touches stock
    pub async fn update_order(
        &self,
        ctx: &AuthContext,
        id: &Uuid,
        input: UpdateOrderInput,
    ) -> ApiResult<Order> {
        let mut order = self.get_order(ctx, id).await?;

        if let Some(next) = input.status {
            if !order.status.can_transition_to(next) {
                return Err(ConflictError::InvalidStatusTransition {
                    from: order.status.as_str().to_string(),
                    to: next.as_str().to_string(),
                }
                .into());
            }
            order.status = next;
        }
        if let Some(shipping_cost) = input.shipping_cost {
            if shipping_cost < Decimal::ZERO {
                return Err(ValidationError::InvalidField {
                    field: "shipping_cost",
                    message: "must not be negative".to_string(),
                }
                .into());
            }
            order.shipping_cost = shipping_cost;
            order.recalculate();
        }
        if let Some(tracking_number) = input.tracking_number {
            order.tracking_number = Some(tracking_number);
        }
        if let Some(payment_status) = input.payment_status {
            order.payment_status = Some(payment_status);
        }

        order.touch();
        self.orders.update(order).await
    }

    /// Cancel an order, restoring reserved inventory.
    ///
    /// Cancelling twice yields the already-cancelled conflict; a completed
    /// order can no longer be cancelled.
    pub async fn cancel_order(&self, ctx: &AuthContext, id: &Uuid) -> ApiResult<Order> {
        let mut order = self.get_order(ctx, id).await?;

        match order.status {
            OrderStatus::Cancelled => {
                return Err(ConflictError::OrderAlreadyCancelled { order_id: *id }.into());
            }
            OrderStatus::Completed => {
                return Err(ConflictError::InvalidStatusTransition {
                    from: order.status.as_str().to_string(),
                    to: OrderStatus::Cancelled.as_str().to_string(),
                }
                .into());
            }
            OrderStatus::Pending => {}
        }

        order.status = OrderStatus::Cancelled;
        order.touch();
        let order = self.orders.update(order).await?;

        self.restore_items(&order).await;
        tracing::info!(order_id = %order.id, "order cancelled");
        Ok(order)
    }

    /// Soft-delete an order. Inventory is restored only when the caller
    /// asks for it; deletion is not implicitly a cancellation.
    pub async fn delete_order(
        &self,
        ctx: &AuthContext,
        id: &Uuid,
        restore_stock: bool,
    ) -> ApiResult<()> {
        let mut order = self.get_order(ctx, id).await?;

        // A cancelled order already had its stock restored
        if restore_stock && order.status != OrderStatus::Cancelled {
            self.restore_items(&order).await;
        }

        order.deletion = crate::core::entity::Deletion::now();
        order.touch();
        self.orders.update(order).await?;

        tracing::info!(order_id = %id, restore_stock, "order deleted");
        Ok(())
    }

    /// Release every reservation made for a failed creation attempt.
    /// Mandatory compensation: failures are logged, never swallowed into
    /// the caller's error.
    async fn release_all(&self, reserved: &[(Uuid, i64)]) {
        let releases = reserved
            .iter()
            .map(|(product_id, quantity)| async move {
                if let Err(err) = self.ledger.release(product_id, *quantity).await {
                    tracing::error!(
                        product_id = %product_id,
                        quantity,
                        error = %err,
                        "failed to release reserved stock"
                    );
                }
            });
        futures::future::join_all(releases).await;
    }

    /// Restore inventory for every item of an order
    async fn restore_items(&self, order: &Order) {
        for item in &order.items {
            if let Err(err) = self.ledger.release(&item.product_id, item.quantity).await {
                tracing::warn!(
                    order_id = %order.id,
                    product_id = %item.product_id,
                    error = %err,
                    "failed to restore stock for order item"
                );
            }
        }
    }
}
