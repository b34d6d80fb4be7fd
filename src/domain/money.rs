//! Integer money.
//!
//! Every monetary value in the system is a count of centavos held in an
//! `i64`. Arithmetic stays in integers end to end; the UI is the only place
//! that ever renders reais.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// A monetary value in centavos.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[sqlx(transparent)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Floors the value at zero.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// Applies a basis-point fraction with round-half-up, e.g. 5300 bps of
    /// R$ 100,00 is R$ 53,00. Intermediates run in i128 so large order values
    /// cannot overflow.
    pub fn mul_bps(&self, bps: u32) -> Money {
        let cents = (self.0 as i128 * bps as i128 + 5_000) / 10_000;
        Money(cents as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R$ {},{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(Money::from_cents(-50).clamp_non_negative(), Money::zero());
        assert_eq!(Money::from_cents(50).clamp_non_negative().cents(), 50);
    }

    #[test]
    fn test_mul_bps_rounds_half_up() {
        // 10% of 10.000 centavos
        assert_eq!(Money::from_cents(10_000).mul_bps(1000).cents(), 1000);
        // 3% of 4.990 centavos = 149,7 -> 150
        assert_eq!(Money::from_cents(4990).mul_bps(300).cents(), 150);
        // 53% of 99 centavos = 52,47 -> 52
        assert_eq!(Money::from_cents(99).mul_bps(5300).cents(), 52);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "R$ 10,99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-R$ 5,50");
        assert_eq!(format!("{}", Money::zero()), "R$ 0,00");
    }
}
