//! Product entity
//!
//! A product either manages stock locally (`quantity` + `price`) or points
//! at an external listing (`external_url`); the two are mutually exclusive.
//! `quantity: None` means unlimited availability (digital items), which the
//! inventory ledger treats as exempt from reservation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::{Deletion, Entity};
use crate::core::error::{ApiResult, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    Inactive,
    OutOfStock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Local unit price; `None` for external-URL listings
    pub price: Option<Decimal>,
    /// Available quantity; `None` means unlimited
    pub quantity: Option<i64>,
    pub status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deleted_at", default)]
    pub deletion: Deletion,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        price: Option<Decimal>,
        quantity: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            price,
            quantity,
            status: ProductStatus::Active,
            external_url: None,
            created_at: now,
            updated_at: now,
            deletion: Deletion::Active,
        }
    }

    /// Fulfilled through an external listing; never stocked locally
    pub fn is_externally_fulfilled(&self) -> bool {
        self.external_url.is_some()
    }

    /// Whether the inventory ledger manages this product's quantity
    pub fn tracks_stock(&self) -> bool {
        self.external_url.is_none() && self.quantity.is_some()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Enforce the product invariants: non-negative quantity, and external
    /// listings never manage stock locally.
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(q) = self.quantity {
            if q < 0 {
                return Err(ValidationError::InvalidField {
                    field: "quantity",
                    message: format!("must not be negative (got {})", q),
                }
                .into());
            }
        }
        if let Some(p) = self.price {
            if p < Decimal::ZERO {
                return Err(ValidationError::InvalidField {
                    field: "price",
                    message: format!("must not be negative (got {})", p),
                }
                .into());
            }
        }
        if self.external_url.is_some() && self.quantity.is_some() {
            return Err(ValidationError::InvalidField {
                field: "external_url",
                message: "externally fulfilled products cannot manage local stock".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Entity for Product {
    fn resource_name() -> &'static str {
        "product"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn deletion(&self) -> &Deletion {
        &self.deletion
    }
}
