//! Order aggregate: order, items, status machine and payment descriptors
//!
//! An order exclusively owns its items; they are created and persisted as
//! one unit. Each item snapshots the unit price at order time, so later
//! product price changes never affect existing orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::{Deletion, Entity};
use crate::core::money;

/// Order lifecycle state.
///
/// `Pending -> Completed` and `Pending -> Cancelled` are the only legal
/// transitions; `Completed` and `Cancelled` are terminal. Soft deletion is
/// orthogonal and tracked by [`Deletion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::Pending, OrderStatus::Completed) => true,
            (OrderStatus::Pending, OrderStatus::Cancelled) => true,
            (current, next) => current == next,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    Pix,
    BankSlip,
}

impl PaymentMethod {
    /// Card-based methods require card data and a billing address
    pub fn requires_card(self) -> bool {
        matches!(self, PaymentMethod::CreditCard | PaymentMethod::DebitCard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refused,
    Refunded,
}

/// Structured billing address; a free-form string is not accepted
#[derive(Debug, Clone, Serialize, Deserialize, validator::Validate)]
pub struct BillingAddress {
    #[validate(length(min = 1))]
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1))]
    pub postal_code: String,
    #[validate(length(min = 2))]
    pub country: String,
}

/// Card details forwarded to the gateway; never persisted or logged
#[derive(Clone, Serialize, Deserialize, validator::Validate)]
pub struct CardData {
    #[validate(length(min = 1))]
    pub holder_name: String,
    #[validate(length(min = 12, max = 19))]
    pub number: String,
    #[validate(range(min = 1, max = 12))]
    pub expiration_month: u8,
    #[validate(range(min = 2020))]
    pub expiration_year: u16,
    #[validate(length(min = 3, max = 4))]
    pub cvv: String,
}

impl std::fmt::Debug for CardData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Redact the PAN and CVV from any debug output
        f.debug_struct("CardData")
            .field("holder_name", &self.holder_name)
            .field("number", &"****")
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .field("cvv", &"***")
            .finish()
    }
}

/// A single line of an order, snapshotting the product at purchase time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    /// Copy of the product price at order time, immutable thereafter
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl OrderItem {
    pub fn new(
        product_id: Uuid,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: Decimal,
        discount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            discount,
            total: money::line_total(unit_price, quantity, discount),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deleted_at", default)]
    pub deletion: Deletion,
}

impl Order {
    pub fn new(
        user_id: Uuid,
        items: Vec<OrderItem>,
        shipping_cost: Decimal,
        tax: Decimal,
    ) -> Self {
        let subtotal: Decimal = items.iter().map(|i| i.total).sum();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            status: OrderStatus::Pending,
            items,
            subtotal,
            shipping_cost,
            tax,
            total: subtotal + shipping_cost + tax,
            payment_method: None,
            payment_status: None,
            transaction_id: None,
            tracking_number: None,
            created_at: now,
            updated_at: now,
            deletion: Deletion::Active,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Recompute subtotal and total from the current items and charges.
    /// Keeps the `total = subtotal + shipping + tax` invariant after a
    /// shipping-cost update.
    pub fn recalculate(&mut self) {
        self.subtotal = self.items.iter().map(|i| i.total).sum();
        self.total = self.subtotal + self.shipping_cost + self.tax;
    }

    /// The order total invariant; every persisted order satisfies this
    pub fn totals_consistent(&self) -> bool {
        self.subtotal == self.items.iter().map(|i| i.total).sum::<Decimal>()
            && self.total == self.subtotal + self.shipping_cost + self.tax
    }
}

impl Entity for Order {
    fn resource_name() -> &'static str {
        "order"
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_items() -> Vec<OrderItem> {
        vec![
            OrderItem::new(Uuid::new_v4(), "Yoga mat", 2, dec!(89.90), Decimal::ZERO),
            OrderItem::new(Uuid::new_v4(), "Herbal tea", 1, dec!(25.50), dec!(5.50)),
        ]
    }

    #[test]
    fn test_item_total_snapshot() {
        let item = OrderItem::new(Uuid::new_v4(), "Yoga mat", 2, dec!(89.90), Decimal::ZERO);
        assert_eq!(item.total, dec!(179.80));
    }

    #[test]
    fn test_order_totals_invariant() {
        let order = Order::new(Uuid::new_v4(), sample_items(), dec!(12.00), dec!(3.45));
        assert_eq!(order.subtotal, dec!(199.80));
        assert_eq!(order.total, dec!(215.25));
        assert!(order.totals_consistent());
    }

    #[test]
    fn test_recalculate_after_shipping_change() {
        let mut order = Order::new(Uuid::new_v4(), sample_items(), dec!(12.00), dec!(3.45));
        order.shipping_cost = dec!(20.00);
        order.recalculate();
        assert!(order.totals_consistent());
        assert_eq!(order.total, dec!(223.25));
    }

    #[test]
    fn test_status_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_card_methods_require_card() {
        assert!(PaymentMethod::CreditCard.requires_card());
        assert!(PaymentMethod::DebitCard.requires_card());
        assert!(!PaymentMethod::Pix.requires_card());
        assert!(!PaymentMethod::BankSlip.requires_card());
    }

    #[test]
    fn test_card_debug_is_redacted() {
        let card = CardData {
            holder_name: "ANA SILVA".to_string(),
            number: "4111111111111111".to_string(),
            expiration_month: 12,
            expiration_year: 2030,
            cvv: "123".to_string(),
        };
        let debug = format!("{:?}", card);
        assert!(!debug.contains("4111111111111111"));
        assert!(!debug.contains("123\""));
    }
}
