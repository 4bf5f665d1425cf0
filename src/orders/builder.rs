//! Order aggregate building
//!
//! Turns validated cart lines into order items, snapshotting the unit
//! price so later catalog changes cannot affect the order. Totals are
//! computed by [`Order::new`](crate::domain::Order::new) from these items;
//! everything stays in `Decimal` until gateway submission.

use crate::domain::cart::ValidCartItem;
use crate::domain::order::OrderItem;

/// Build order items from validated cart lines
pub fn build_items(valid_items: &[ValidCartItem]) -> Vec<OrderItem> {
    valid_items
        .iter()
        .map(|item| {
            OrderItem::new(
                item.product_id,
                item.product_name.clone(),
                item.quantity,
                item.unit_price,
                item.discount,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Order;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn valid_item(quantity: i64, unit_price: Decimal, discount: Decimal) -> ValidCartItem {
        ValidCartItem {
            product_id: Uuid::new_v4(),
            product_name: "item".to_string(),
            quantity,
            unit_price,
            discount,
        }
    }

    #[test]
    fn test_items_snapshot_price_and_compute_line_totals() {
        let items = build_items(&[
            valid_item(3, dec!(19.90), Decimal::ZERO),
            valid_item(1, dec!(100.00), dec!(10.00)),
        ]);

        assert_eq!(items[0].total, dec!(59.70));
        assert_eq!(items[1].total, dec!(90.00));
    }

    #[test]
    fn test_discount_floors_line_at_zero() {
        let items = build_items(&[valid_item(1, dec!(5.00), dec!(9.00))]);
        assert_eq!(items[0].total, Decimal::ZERO);
    }

    #[test]
    fn test_order_total_invariant_holds() {
        let items = build_items(&[
            valid_item(2, dec!(33.33), Decimal::ZERO),
            valid_item(3, dec!(0.10), Decimal::ZERO),
        ]);
        let order = Order::new(Uuid::new_v4(), items, dec!(7.50), dec!(1.25));

        assert_eq!(order.subtotal, dec!(66.96));
        assert_eq!(order.total, order.subtotal + order.shipping_cost + order.tax);
        assert!(order.totals_consistent());
    }
}
