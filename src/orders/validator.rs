//! Cart validation
//!
//! Pure read-and-classify over current product state. Never mutates
//! inventory; reservation happens later, in the order lifecycle.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::core::error::{ApiResult, ValidationError};
use crate::domain::cart::{
    CartItemRequest, CartValidation, InvalidCartItem, InvalidReason, ValidCartItem,
};
use crate::domain::product::ProductStatus;
use crate::storage::repository::ProductRepository;

/// Classifies requested cart lines against the product catalog
#[derive(Clone)]
pub struct CartValidator {
    products: Arc<dyn ProductRepository>,
}

impl CartValidator {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Classify each requested line independently.
    ///
    /// Exactly one reason is reported per invalid line; when several
    /// conditions hold the precedence is: not_found > inactive >
    /// external_url > no_price > out_of_stock > insufficient_stock.
    ///
    /// Quantities must be positive and discounts non-negative; those are
    /// request-shape problems, not classifications, and fail the whole
    /// call.
    pub async fn validate(&self, requests: &[CartItemRequest]) -> ApiResult<CartValidation> {
        let mut result = CartValidation::default();

        for request in requests {
            if request.quantity <= 0 {
                return Err(ValidationError::InvalidField {
                    field: "quantity",
                    message: format!("must be positive (got {})", request.quantity),
                }
                .into());
            }
            let discount = request.discount.unwrap_or(Decimal::ZERO);
            if discount < Decimal::ZERO {
                return Err(ValidationError::InvalidField {
                    field: "discount",
                    message: format!("must not be negative (got {})", discount),
                }
                .into());
            }

            let Some(product) = self.products.get(&request.product_id).await? else {
                result.invalid_items.push(InvalidCartItem {
                    product_id: request.product_id,
                    reason: InvalidReason::NotFound,
                    requested_quantity: request.quantity,
                    available_quantity: None,
                });
                continue;
            };

            if product.status != ProductStatus::Active {
                result.invalid_items.push(InvalidCartItem {
                    product_id: request.product_id,
                    reason: InvalidReason::Inactive,
                    requested_quantity: request.quantity,
                    available_quantity: product.quantity,
                });
                continue;
            }

            if product.is_externally_fulfilled() {
                result.invalid_items.push(InvalidCartItem {
                    product_id: request.product_id,
                    reason: InvalidReason::ExternalUrl,
                    requested_quantity: request.quantity,
                    available_quantity: None,
                });
                continue;
            }

            let Some(unit_price) = product.price else {
                result.invalid_items.push(InvalidCartItem {
                    product_id: request.product_id,
                    reason: InvalidReason::NoPrice,
                    requested_quantity: request.quantity,
                    available_quantity: product.quantity,
                });
                continue;
            };

            match product.quantity {
                // Unlimited availability
                None => result.valid_items.push(ValidCartItem {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    quantity: request.quantity,
                    unit_price,
                    discount,
                }),
                Some(0) => result.invalid_items.push(InvalidCartItem {
                    product_id: request.product_id,
                    reason: InvalidReason::OutOfStock,
                    requested_quantity: request.quantity,
                    available_quantity: Some(0),
                }),
                Some(available) if available < request.quantity => {
                    result.invalid_items.push(InvalidCartItem {
                        product_id: request.product_id,
                        reason: InvalidReason::InsufficientStock,
                        requested_quantity: request.quantity,
                        available_quantity: Some(available),
                    })
                }
                Some(_) => result.valid_items.push(ValidCartItem {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    quantity: request.quantity,
                    unit_price,
                    discount,
                }),
            }
        }

        Ok(result)
    }
}
