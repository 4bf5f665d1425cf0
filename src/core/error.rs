//! Typed error handling for the wellmarket backend
//!
//! This module provides the error hierarchy shared by every service and
//! handler. Clients match errors structurally (never by message content)
//! and each error maps to exactly one HTTP status code.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: malformed or missing request data (400)
//! - [`AuthError`]: missing or insufficient caller identity (401/403)
//! - [`ConflictError`]: state conflicts such as double cancellation (409)
//! - [`PaymentError`]: gateway declines and gateway transport errors (400)
//! - `NotFound`: absent or soft-deleted entities (404)
//! - `InsufficientStock`: reservation floor-check failures (400)
//! - `Unexpected`: anything else, logged and surfaced as an opaque 500
//!
//! # Example
//!
//! ```rust,ignore
//! match service.cancel_order(&ctx, &id).await {
//!     Err(ApiError::Conflict(ConflictError::OrderAlreadyCancelled { .. })) => {
//!         // second cancel of the same order
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//!     Ok(order) => println!("cancelled {}", order.id),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::domain::cart::InvalidCartItem;

/// Result alias used throughout the crate
pub type ApiResult<T> = Result<T, ApiError>;

/// The main error type for the wellmarket backend
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing request data
    Validation(ValidationError),

    /// Missing or insufficient caller identity
    Auth(AuthError),

    /// Entity absent or soft-deleted
    NotFound { resource: &'static str, id: Uuid },

    /// State conflicts (double cancel, invalid transition, duplicates)
    Conflict(ConflictError),

    /// Reservation failed the quantity floor check
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    /// Gateway declined or errored
    Payment(PaymentError),

    /// Anything else; logged with context, surfaced as an opaque 500
    Unexpected(anyhow::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::Auth(e) => write!(f, "{}", e),
            ApiError::NotFound { resource, id } => {
                write!(f, "{} with id '{}' not found", resource, id)
            }
            ApiError::Conflict(e) => write!(f, "{}", e),
            ApiError::InsufficientStock {
                product_id,
                requested,
                available,
            } => write!(
                f,
                "insufficient stock for product {}: requested {}, available {}",
                product_id, requested, available
            ),
            ApiError::Payment(e) => write!(f, "{}", e),
            ApiError::Unexpected(_) => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Validation(e) => Some(e),
            ApiError::Auth(e) => Some(e),
            ApiError::Conflict(e) => Some(e),
            ApiError::Payment(e) => Some(e),
            ApiError::Unexpected(e) => e.source(),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Unexpected(err)
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Unexpected(anyhow::Error::new(err))
    }
}

/// Error payload embedded in the response envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error code for programmatic handling
    pub code: String,
    /// Optional structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(e) => e.status_code(),
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            ApiError::Payment(_) => StatusCode::BAD_REQUEST,
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Auth(AuthError::Unauthenticated) => "UNAUTHENTICATED",
            ApiError::Auth(AuthError::NotOwner { .. }) => "FORBIDDEN",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            ApiError::Payment(_) => "PAYMENT_ERROR",
            ApiError::Unexpected(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to the error payload for the response envelope
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.error_code().to_string(),
            details: self.details(),
        }
    }

    /// Structured details for the error, when they help the caller
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::NotFound { resource, id } => Some(serde_json::json!({
                "resource": resource,
                "id": id.to_string(),
            })),
            ApiError::InsufficientStock {
                product_id,
                requested,
                available,
            } => Some(serde_json::json!({
                "product_id": product_id.to_string(),
                "requested": requested,
                "available": available,
            })),
            ApiError::Validation(ValidationError::InvalidCart { items }) => {
                Some(serde_json::json!({ "invalid_items": items }))
            }
            ApiError::Validation(ValidationError::FieldErrors { fields }) => {
                Some(serde_json::json!({ "fields": fields }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Unexpected(ref err) = self {
            tracing::error!(error = %err, "unexpected error while handling request");
        }

        let status = self.status_code();
        let body = Json(serde_json::json!({
            "success": false,
            "message": self.to_string(),
            "error": self.to_body(),
        }));
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors for malformed or missing request data
#[derive(Debug)]
pub enum ValidationError {
    /// A required field is missing
    MissingField { field: &'static str },

    /// A field is present but invalid
    InvalidField { field: &'static str, message: String },

    /// One or more request DTO fields failed shape validation
    FieldErrors { fields: Vec<String> },

    /// At least one cart item failed classification; the whole order is rejected
    InvalidCart { items: Vec<InvalidCartItem> },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField { field } => {
                write!(f, "required field '{}' is missing", field)
            }
            ValidationError::InvalidField { field, message } => {
                write!(f, "invalid field '{}': {}", field, message)
            }
            ValidationError::FieldErrors { fields } => {
                write!(f, "request validation failed: {}", fields.join("; "))
            }
            ValidationError::InvalidCart { items } => {
                write!(f, "{} cart item(s) failed validation", items.len())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{}: {}", field, msg),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        ApiError::Validation(ValidationError::FieldErrors { fields })
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors for missing or insufficient caller identity
#[derive(Debug)]
pub enum AuthError {
    /// No identity was supplied by the auth middleware
    Unauthenticated,

    /// Authenticated, but not the owner of the resource
    NotOwner { resource: &'static str, id: Uuid },
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::NotOwner { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthenticated => write!(f, "authentication required"),
            AuthError::NotOwner { resource, id } => {
                write!(f, "not allowed to access {} '{}'", resource, id)
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

// =============================================================================
// Conflict Errors
// =============================================================================

/// Errors for state conflicts
#[derive(Debug)]
pub enum ConflictError {
    /// The order was already cancelled; cancellation is terminal
    OrderAlreadyCancelled { order_id: Uuid },

    /// The requested status change is not a legal transition
    InvalidStatusTransition { from: String, to: String },

    /// A unique constraint was violated
    Duplicate {
        resource: &'static str,
        field: &'static str,
    },
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::OrderAlreadyCancelled { order_id } => {
                write!(f, "order '{}' is already cancelled", order_id)
            }
            ConflictError::InvalidStatusTransition { from, to } => {
                write!(f, "cannot transition order from '{}' to '{}'", from, to)
            }
            ConflictError::Duplicate { resource, field } => {
                write!(f, "a {} with this {} already exists", resource, field)
            }
        }
    }
}

impl std::error::Error for ConflictError {}

impl From<ConflictError> for ApiError {
    fn from(err: ConflictError) -> Self {
        ApiError::Conflict(err)
    }
}

// =============================================================================
// Payment Errors
// =============================================================================

/// Errors from the payment gateway, all surfaced as business failures
#[derive(Debug)]
pub enum PaymentError {
    /// The gateway processed the charge and declined it
    Declined { message: String },

    /// The gateway call itself failed (timeout, transport, 5xx)
    Gateway { message: String },
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::Declined { message } => write!(f, "payment declined: {}", message),
            PaymentError::Gateway { message } => write!(f, "payment failed: {}", message),
        }
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::Payment(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Status codes ===

    #[test]
    fn test_not_found_returns_404() {
        let err = ApiError::NotFound {
            resource: "order",
            id: Uuid::new_v4(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_returns_400() {
        let err = ApiError::Validation(ValidationError::MissingField { field: "items" });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unauthenticated_returns_401() {
        let err = ApiError::Auth(AuthError::Unauthenticated);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_not_owner_returns_403() {
        let err = ApiError::Auth(AuthError::NotOwner {
            resource: "order",
            id: Uuid::new_v4(),
        });
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_already_cancelled_returns_409() {
        let err = ApiError::Conflict(ConflictError::OrderAlreadyCancelled {
            order_id: Uuid::new_v4(),
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_insufficient_stock_returns_400() {
        let err = ApiError::InsufficientStock {
            product_id: Uuid::new_v4(),
            requested: 5,
            available: 2,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_payment_errors_return_400() {
        let declined = ApiError::Payment(PaymentError::Declined {
            message: "card refused".to_string(),
        });
        let gateway = ApiError::Payment(PaymentError::Gateway {
            message: "timeout".to_string(),
        });
        assert_eq!(declined.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(gateway.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unexpected_returns_500_and_opaque_message() {
        let err = ApiError::Unexpected(anyhow::anyhow!("connection pool exhausted"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        // Internals must not leak into the client-facing message
        assert_eq!(err.to_string(), "Internal server error");
    }

    // === Error codes ===

    #[test]
    fn test_error_codes_are_stable() {
        let err = ApiError::InsufficientStock {
            product_id: Uuid::new_v4(),
            requested: 1,
            available: 0,
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_STOCK");

        let err = ApiError::Auth(AuthError::Unauthenticated);
        assert_eq!(err.error_code(), "UNAUTHENTICATED");
    }

    // === Details ===

    #[test]
    fn test_insufficient_stock_details() {
        let product_id = Uuid::new_v4();
        let err = ApiError::InsufficientStock {
            product_id,
            requested: 5,
            available: 2,
        };
        let details = err.to_body().details.expect("details should be present");
        assert_eq!(details["requested"], 5);
        assert_eq!(details["available"], 2);
        assert_eq!(details["product_id"], product_id.to_string());
    }

    #[test]
    fn test_structural_matching() {
        // Clients select on variants, not message substrings
        let err = ApiError::Conflict(ConflictError::OrderAlreadyCancelled {
            order_id: Uuid::new_v4(),
        });
        assert!(matches!(
            err,
            ApiError::Conflict(ConflictError::OrderAlreadyCancelled { .. })
        ));
    }
}
