//! HTTP handlers
//!
//! Thin wrappers over the services: parse and validate the request, call
//! the service, wrap the result in the `{success, message, data | error}`
//! envelope. Errors become envelopes through `ApiError::into_response`.

pub mod orders;
pub mod products;
pub mod users;

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// Success envelope
pub fn envelope<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message,
        "data": data,
    }))
}
