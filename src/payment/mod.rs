//! Payment gateway adapter
//!
//! The real gateway is an external service; the backend only depends on
//! the [`PaymentGateway`] trait. Amounts handed to the gateway are already
//! rounded to 2 decimal places by the caller. Every gateway failure is a
//! business-level payment error, never a 500.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::core::error::{ApiResult, PaymentError};
use crate::domain::{BillingAddress, CardData, PaymentMethod};

/// Revenue split: a share of each charge routed to a secondary recipient.
///
/// Built from validated configuration at startup; `percentage` is always
/// in (0, 100] by the time a value of this type exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSplit {
    pub recipient_id: String,
    pub percentage: Decimal,
}

/// A charge submitted to the gateway
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub order_id: Uuid,
    /// Rounded to 2 decimal places before submission
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub card: Option<CardData>,
    pub billing_address: Option<BillingAddress>,
    pub split: Option<RevenueSplit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Approved,
    Declined,
    Refunded,
}

/// Gateway response for a charge, capture or refund
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeOutcome {
    pub transaction_id: String,
    pub status: ChargeStatus,
}

/// Interface to the external payment gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge an instrument for the given amount, optionally splitting
    /// revenue between recipients
    async fn charge(&self, request: ChargeRequest) -> ApiResult<ChargeOutcome>;

    /// Capture a previously authorized charge
    async fn capture(&self, transaction_id: &str) -> ApiResult<ChargeOutcome>;

    /// Refund a settled charge, partially or fully
    async fn refund(&self, transaction_id: &str, amount: Decimal) -> ApiResult<ChargeOutcome>;
}

/// How the stub gateway responds to charges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StubMode {
    Approve,
    Decline,
    Fail,
}

/// In-process gateway for development and tests.
///
/// Approves everything by default; can be switched to decline charges or
/// to fail as if the gateway were unreachable. Submitted charges are
/// recorded for inspection.
pub struct StubGateway {
    mode: StubMode,
    charges: Arc<Mutex<Vec<ChargeRequest>>>,
}

impl StubGateway {
    /// A gateway that approves every charge
    pub fn approving() -> Self {
        Self {
            mode: StubMode::Approve,
            charges: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A gateway that declines every charge
    pub fn declining() -> Self {
        Self {
            mode: StubMode::Decline,
            ..Self::approving()
        }
    }

    /// A gateway whose calls fail as if unreachable
    pub fn failing() -> Self {
        Self {
            mode: StubMode::Fail,
            ..Self::approving()
        }
    }

    /// Charges submitted so far
    pub fn recorded_charges(&self) -> Vec<ChargeRequest> {
        self.charges.lock().expect("charge log lock poisoned").clone()
    }
}

impl Default for StubGateway {
    fn default() -> Self {
        Self::approving()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn charge(&self, request: ChargeRequest) -> ApiResult<ChargeOutcome> {
        let split_amount = request
            .split
            .as_ref()
            .map(|s| crate::core::money::percentage_of(request.amount, s.percentage));
        tracing::debug!(
            order_id = %request.order_id,
            amount = %request.amount,
            split_amount = ?split_amount,
            "stub gateway charge"
        );

        self.charges
            .lock()
            .map_err(|e| {
                crate::core::error::ApiError::Unexpected(anyhow::anyhow!(
                    "failed to acquire charge log lock: {}",
                    e
                ))
            })?
            .push(request.clone());

        match self.mode {
            StubMode::Approve => Ok(ChargeOutcome {
                transaction_id: format!("stub-{}", Uuid::new_v4()),
                status: ChargeStatus::Approved,
            }),
            StubMode::Decline => Ok(ChargeOutcome {
                transaction_id: format!("stub-{}", Uuid::new_v4()),
                status: ChargeStatus::Declined,
            }),
            StubMode::Fail => Err(PaymentError::Gateway {
                message: "gateway unreachable".to_string(),
            }
            .into()),
        }
    }

    async fn capture(&self, transaction_id: &str) -> ApiResult<ChargeOutcome> {
        match self.mode {
            StubMode::Fail => Err(PaymentError::Gateway {
                message: "gateway unreachable".to_string(),
            }
            .into()),
            _ => Ok(ChargeOutcome {
                transaction_id: transaction_id.to_string(),
                status: ChargeStatus::Approved,
            }),
        }
    }

    async fn refund(&self, transaction_id: &str, amount: Decimal) -> ApiResult<ChargeOutcome> {
        tracing::debug!(transaction_id, amount = %amount, "stub gateway refund");
        match self.mode {
            StubMode::Fail => Err(PaymentError::Gateway {
                message: "gateway unreachable".to_string(),
            }
            .into()),
            _ => Ok(ChargeOutcome {
                transaction_id: transaction_id.to_string(),
                status: ChargeStatus::Refunded,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ApiError;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal) -> ChargeRequest {
        ChargeRequest {
            order_id: Uuid::new_v4(),
            amount,
            method: PaymentMethod::Pix,
            card: None,
            billing_address: None,
            split: None,
        }
    }

    #[tokio::test]
    async fn test_approving_gateway() {
        let gateway = StubGateway::approving();
        let outcome = gateway.charge(request(dec!(100.00))).await.unwrap();
        assert_eq!(outcome.status, ChargeStatus::Approved);
        assert_eq!(gateway.recorded_charges().len(), 1);
    }

    #[tokio::test]
    async fn test_declining_gateway() {
        let gateway = StubGateway::declining();
        let outcome = gateway.charge(request(dec!(100.00))).await.unwrap();
        assert_eq!(outcome.status, ChargeStatus::Declined);
    }

    #[tokio::test]
    async fn test_failing_gateway_maps_to_payment_error() {
        let gateway = StubGateway::failing();
        let err = gateway.charge(request(dec!(100.00))).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Payment(PaymentError::Gateway { .. })
        ));
    }

    #[tokio::test]
    async fn test_refund_round_trip() {
        let gateway = StubGateway::approving();
        let outcome = gateway.charge(request(dec!(50.00))).await.unwrap();
        let refund = gateway
            .refund(&outcome.transaction_id, dec!(50.00))
            .await
            .unwrap();
        assert_eq!(refund.status, ChargeStatus::Refunded);
        assert_eq!(refund.transaction_id, outcome.transaction_id);
    }
}
