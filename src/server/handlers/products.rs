//! Product HTTP handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::envelope;
use crate::core::auth::AuthContext;
use crate::core::error::ApiResult;
use crate::domain::product::ProductStatus;
use crate::products::{CreateProductInput, UpdateProductInput};
use crate::server::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    #[validate(url)]
    pub external_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub status: Option<ProductStatus>,
    #[validate(url)]
    pub external_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RestockRequest {
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
}

pub async fn create_product(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    ctx.require_user()?;
    payload.validate()?;

    let product = state
        .products
        .create_product(CreateProductInput {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            quantity: payload.quantity,
            external_url: payload.external_url,
        })
        .await?;
    Ok((StatusCode::CREATED, envelope("product created", product)))
}

pub async fn list_products(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> ApiResult<impl IntoResponse> {
    ctx.require_user()?;
    let products = state.products.list_products().await?;
    Ok(envelope("products retrieved", products))
}

pub async fn get_product(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ctx.require_user()?;
    let product = state.products.get_product(&id).await?;
    Ok(envelope("product retrieved", product))
}

pub async fn update_product(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<impl IntoResponse> {
    ctx.require_user()?;
    payload.validate()?;

    let product = state
        .products
        .update_product(
            &id,
            UpdateProductInput {
                name: payload.name,
                description: payload.description,
                price: payload.price,
                status: payload.status,
                external_url: payload.external_url,
            },
        )
        .await?;
    Ok(envelope("product updated", product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ctx.require_user()?;
    state.products.delete_product(&id).await?;
    Ok(envelope("product deleted", serde_json::json!({ "id": id })))
}

pub async fn restock_product(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockRequest>,
) -> ApiResult<impl IntoResponse> {
    ctx.require_user()?;
    payload.validate()?;

    let product = state.products.restock(&id, payload.quantity).await?;
    Ok(envelope("product restocked", product))
}
