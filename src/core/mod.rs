//! Core module containing fundamental traits and types for the backend

pub mod auth;
pub mod entity;
pub mod error;
pub mod money;

pub use auth::AuthContext;
pub use entity::{Deletion, Entity};
pub use error::{ApiError, ApiResult, AuthError, ConflictError, PaymentError, ValidationError};
