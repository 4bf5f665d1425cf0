//! Monetary arithmetic helpers
//!
//! All monetary amounts in the system are `rust_decimal::Decimal`; binary
//! floating point never touches money. Internal accumulation keeps full
//! precision, and rounding to 2 decimal places happens exactly once, when
//! an amount is submitted to the payment gateway.

use rust_decimal::{Decimal, RoundingStrategy};

/// Line total for an order item: `unit_price * quantity - discount`,
/// floored at zero so a discount can never make a line negative.
pub fn line_total(unit_price: Decimal, quantity: i64, discount: Decimal) -> Decimal {
    let gross = unit_price * Decimal::from(quantity);
    let net = gross - discount;
    net.max(Decimal::ZERO)
}

/// Round an amount for submission to the payment gateway.
///
/// Midpoints round away from zero (0.005 -> 0.01), matching how card
/// processors quote amounts.
pub fn gateway_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Percentage share of an amount, `percentage` expressed in (0, 100]
pub fn percentage_of(amount: Decimal, percentage: Decimal) -> Decimal {
    amount * percentage / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_total_basic() {
        assert_eq!(line_total(dec!(19.90), 3, Decimal::ZERO), dec!(59.70));
    }

    #[test]
    fn test_line_total_with_discount() {
        assert_eq!(line_total(dec!(10.00), 2, dec!(5.00)), dec!(15.00));
    }

    #[test]
    fn test_line_total_floors_at_zero() {
        assert_eq!(line_total(dec!(10.00), 1, dec!(25.00)), Decimal::ZERO);
    }

    #[test]
    fn test_no_drift_across_accumulation() {
        // 0.1 + 0.2 == 0.3 exactly, which f64 famously gets wrong
        let total = dec!(0.1) + dec!(0.2);
        assert_eq!(total, dec!(0.3));
    }

    #[test]
    fn test_gateway_amount_rounds_half_up() {
        assert_eq!(gateway_amount(dec!(10.005)), dec!(10.01));
        assert_eq!(gateway_amount(dec!(10.004)), dec!(10.00));
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(dec!(200.00), dec!(15)), dec!(30.00));
    }
}
