//! User HTTP handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::envelope;
use crate::core::auth::AuthContext;
use crate::core::error::{ApiError, ApiResult};
use crate::domain::User;
use crate::server::state::AppState;
use crate::storage::repository::UserRepository;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.validate()?;

    let user = state
        .users
        .create(User::new(payload.name, payload.email))
        .await?;
    Ok((StatusCode::CREATED, envelope("user created", user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    ctx.require_user()?;

    let user = state.users.get(&id).await?.ok_or(ApiError::NotFound {
        resource: "user",
        id,
    })?;
    Ok(envelope("user retrieved", user))
}
