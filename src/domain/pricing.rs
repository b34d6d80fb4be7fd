//! Weight-tiered pricing.
//!
//! Products are priced per kilogram and sold by the gram. Heavier lines get
//! a progressively better rate; the highest qualifying tier wins.

use crate::domain::money::Money;

/// Discount tier for a line weight, in basis points.
///
/// Inclusive lower bounds: 1kg and up takes 10%, 500g takes 6%, 250g takes 3%.
pub fn discount_rate_bps(weight_grams: i64) -> u32 {
    if weight_grams >= 1000 {
        1000
    } else if weight_grams >= 500 {
        600
    } else if weight_grams >= 250 {
        300
    } else {
        0
    }
}

/// Prices one line: pro-rates the per-kilogram price over the weight
/// (round-half-up) and subtracts the tier discount.
///
/// Non-positive weights and negative prices yield `Money::zero()` rather
/// than an error; a malformed line is worth nothing.
pub fn price_line_cents(price_per_kg: Money, weight_grams: i64) -> Money {
    if weight_grams <= 0 || price_per_kg.is_negative() {
        return Money::zero();
    }
    let base = (price_per_kg.cents() as i128 * weight_grams as i128 + 500) / 1000;
    let base = Money::from_cents(base as i64);
    base - base.mul_bps(discount_rate_bps(weight_grams))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(discount_rate_bps(1), 0);
        assert_eq!(discount_rate_bps(249), 0);
        assert_eq!(discount_rate_bps(250), 300);
        assert_eq!(discount_rate_bps(499), 300);
        assert_eq!(discount_rate_bps(500), 600);
        assert_eq!(discount_rate_bps(999), 600);
        assert_eq!(discount_rate_bps(1000), 1000);
        assert_eq!(discount_rate_bps(5000), 1000);
    }

    #[test]
    fn test_price_line_reference_values() {
        let per_kg = Money::from_cents(10_000);
        assert_eq!(price_line_cents(per_kg, 1).cents(), 10);
        assert_eq!(price_line_cents(per_kg, 249).cents(), 2490);
        assert_eq!(price_line_cents(per_kg, 250).cents(), 2425);
        assert_eq!(price_line_cents(per_kg, 499).cents(), 4840);
        assert_eq!(price_line_cents(per_kg, 500).cents(), 4700);
        assert_eq!(price_line_cents(per_kg, 999).cents(), 9391);
        assert_eq!(price_line_cents(per_kg, 1000).cents(), 9000);
        assert_eq!(price_line_cents(per_kg, 5000).cents(), 45_000);
    }

    #[test]
    fn test_monotonic_within_a_tier() {
        let per_kg = Money::from_cents(10_000);
        let mut last = Money::zero();
        for grams in 250..500 {
            let price = price_line_cents(per_kg, grams);
            assert!(price >= last, "price dipped at {grams}g");
            last = price;
        }
    }

    #[test]
    fn test_deterministic() {
        let per_kg = Money::from_cents(7345);
        assert_eq!(
            price_line_cents(per_kg, 730),
            price_line_cents(per_kg, 730)
        );
    }

    #[test]
    fn test_degenerate_inputs_price_at_zero() {
        assert_eq!(price_line_cents(Money::from_cents(10_000), 0), Money::zero());
        assert_eq!(price_line_cents(Money::from_cents(10_000), -5), Money::zero());
        assert_eq!(price_line_cents(Money::from_cents(-100), 500), Money::zero());
        assert_eq!(price_line_cents(Money::zero(), 500), Money::zero());
    }
}
