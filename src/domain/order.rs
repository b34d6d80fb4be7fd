//! Order totals.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money::Money;
use crate::domain::pricing::price_line_cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Dispatched,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Dispatched => "dispatched",
        }
    }
}

/// One priced product-weight entry, as submitted at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub price_per_kg_cents: Money,
    pub weight_grams: i64,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        price_line_cents(self.price_per_kg_cents, self.weight_grams)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal_cents: Money,
    pub discount_cents: Money,
    pub shipping_cents: Money,
    pub total_cents: Money,
}

/// Folds priced lines, a coupon discount and a shipping fee into the order
/// total. The discount is clamped to `[0, subtotal]` and shipping to `>= 0`,
/// so the total can never go negative.
pub fn compute_order_totals(
    items: &[OrderLine],
    discount: Money,
    shipping: Money,
) -> OrderTotals {
    let subtotal: Money = items.iter().map(OrderLine::line_total).sum();
    let discount = discount.clamp_non_negative().min(subtotal);
    let shipping = shipping.clamp_non_negative();
    OrderTotals {
        subtotal_cents: subtotal,
        discount_cents: discount,
        shipping_cents: shipping,
        total_cents: subtotal - discount + shipping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(per_kg: i64, grams: i64) -> OrderLine {
        OrderLine {
            product_id: Uuid::new_v4(),
            price_per_kg_cents: Money::from_cents(per_kg),
            weight_grams: grams,
        }
    }

    #[test]
    fn test_checkout_reference_scenario() {
        // 1kg at R$ 100,00/kg prices at 9.000 after the 10% tier; a 10%-off
        // coupon takes 900; manual shipping for 5km is 1090 + 5*290 = 2540.
        let items = vec![line(10_000, 1000)];
        let totals = compute_order_totals(
            &items,
            Money::from_cents(900),
            Money::from_cents(2540),
        );
        assert_eq!(totals.subtotal_cents.cents(), 9000);
        assert_eq!(totals.discount_cents.cents(), 900);
        assert_eq!(totals.shipping_cents.cents(), 2540);
        assert_eq!(totals.total_cents.cents(), 10_640);
    }

    #[test]
    fn test_discount_clamped_to_subtotal() {
        let items = vec![line(1000, 100)]; // 100 centavos
        let totals = compute_order_totals(&items, Money::from_cents(5000), Money::zero());
        assert_eq!(totals.discount_cents, totals.subtotal_cents);
        assert_eq!(totals.total_cents, Money::zero());
    }

    #[test]
    fn test_negative_discount_clamped_to_zero() {
        let items = vec![line(1000, 100)];
        let totals = compute_order_totals(&items, Money::from_cents(-300), Money::zero());
        assert_eq!(totals.discount_cents, Money::zero());
        assert_eq!(totals.total_cents, totals.subtotal_cents);
    }

    #[test]
    fn test_round_trip_identity() {
        let cases = [
            (vec![line(10_000, 1000), line(6990, 250)], 500, 2540),
            (vec![line(8990, 499)], 0, 0),
            (vec![], 1000, 1090),
            (vec![line(12_500, 750), line(4590, 100), line(9990, 2000)], 99_999, 310),
        ];
        for (items, discount, shipping) in cases {
            let t = compute_order_totals(
                &items,
                Money::from_cents(discount),
                Money::from_cents(shipping),
            );
            assert_eq!(
                t.subtotal_cents - t.discount_cents + t.shipping_cents,
                t.total_cents
            );
            assert!(t.discount_cents <= t.subtotal_cents);
            assert!(!t.total_cents.is_negative());
        }
    }

    #[test]
    fn test_pure_and_repeatable() {
        let items = vec![line(10_000, 1000), line(6990, 350)];
        let a = compute_order_totals(&items, Money::from_cents(700), Money::from_cents(1090));
        let b = compute_order_totals(&items, Money::from_cents(700), Money::from_cents(1090));
        assert_eq!(a, b);
    }
}
