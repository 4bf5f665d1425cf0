//! Cart classification types
//!
//! These are ephemeral results of validating requested `(product, quantity)`
//! pairs against current product state; nothing here is persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A requested cart line, before validation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
    /// Optional per-item discount, folded into the line total
    #[serde(default)]
    pub discount: Option<Decimal>,
}

/// Why a requested item cannot be ordered.
///
/// Exactly one reason is reported per item; when several conditions hold
/// the first in this declaration order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    /// No such product, or it was soft-deleted
    NotFound,
    /// Product status is not active
    Inactive,
    /// Fulfilled through an external listing; cannot be ordered here
    ExternalUrl,
    /// Product has no local price
    NoPrice,
    /// Available quantity is exactly zero
    OutOfStock,
    /// Requested more than the available quantity
    InsufficientStock,
}

/// A rejected cart line with its single classification reason
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidCartItem {
    pub product_id: Uuid,
    pub reason: InvalidReason,
    pub requested_quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_quantity: Option<i64>,
}

/// An accepted cart line, resolved to the current product state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidCartItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub discount: Decimal,
}

/// Result of classifying a cart: two partitions, no side effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartValidation {
    pub valid_items: Vec<ValidCartItem>,
    pub invalid_items: Vec<InvalidCartItem>,
}

impl CartValidation {
    pub fn is_fully_valid(&self) -> bool {
        self.invalid_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_value(InvalidReason::InsufficientStock).unwrap();
        assert_eq!(json, "insufficient_stock");
        let json = serde_json::to_value(InvalidReason::OutOfStock).unwrap();
        assert_eq!(json, "out_of_stock");
    }

    #[test]
    fn test_request_quantity_must_be_positive() {
        let req = CartItemRequest {
            product_id: Uuid::new_v4(),
            quantity: 0,
            discount: None,
        };
        assert!(req.validate().is_err());
    }
}
