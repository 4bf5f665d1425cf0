//! Order HTTP handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::envelope;
use crate::core::auth::AuthContext;
use crate::core::error::ApiResult;
use crate::domain::cart::CartItemRequest;
use crate::domain::order::{
    BillingAddress, CardData, OrderStatus, PaymentMethod, PaymentStatus,
};
use crate::orders::{CreateOrderInput, UpdateOrderInput};
use crate::server::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<CartItemRequest>,
    pub payment_method: PaymentMethod,
    #[validate(nested)]
    pub card_data: Option<CardData>,
    #[validate(nested)]
    pub billing_address: Option<BillingAddress>,
    #[serde(default)]
    pub shipping_cost: Decimal,
    #[serde(default)]
    pub tax: Decimal,
}

impl CreateOrderRequest {
    fn into_input(self) -> CreateOrderInput {
        CreateOrderInput {
            items: self.items,
            payment_method: self.payment_method,
            card_data: self.card_data,
            billing_address: self.billing_address,
            shipping_cost: self.shipping_cost,
            tax: self.tax,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub shipping_cost: Option<Decimal>,
    pub tracking_number: Option<String>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateCartRequest {
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<CartItemRequest>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DeleteOrderQuery {
    #[serde(default)]
    pub restore_stock: bool,
}

pub async fn create_order(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = ctx.require_user()?;
    payload.validate()?;

    let order = state.orders.create_order(user_id, payload.into_input()).await?;
    Ok((StatusCode::CREATED, envelope("order created", order)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> ApiResult<impl IntoResponse> {
    let orders = state.orders.list_orders(&ctx).await?;
    Ok(envelope("orders retrieved", orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let order = state.orders.get_order(&ctx, &id).await?;
    Ok(envelope("order retrieved", order))
}

pub async fn update_order(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = UpdateOrderInput {
        status: payload.status,
        shipping_cost: payload.shipping_cost,
        tracking_number: payload.tracking_number,
        payment_status: payload.payment_status,
    };
    let order = state.orders.update_order(&ctx, &id, input).await?;
    Ok(envelope("order updated", order))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let order = state.orders.cancel_order(&ctx, &id).await?;
    Ok(envelope("order cancelled", order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteOrderQuery>,
) -> ApiResult<impl IntoResponse> {
    state
        .orders
        .delete_order(&ctx, &id, query.restore_stock)
        .await?;
    Ok(envelope("order deleted", serde_json::json!({ "id": id })))
}

pub async fn validate_cart(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(payload): Json<ValidateCartRequest>,
) -> ApiResult<impl IntoResponse> {
    ctx.require_user()?;
    payload.validate()?;

    let validation = state.orders.validate_cart(&payload.items).await?;
    Ok(envelope("cart validated", validation))
}
