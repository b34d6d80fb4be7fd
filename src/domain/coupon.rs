//! Coupon eligibility and discount computation.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }

    /// Stored values are constrained by the schema; anything else is read
    /// back as a fixed discount.
    pub fn from_db(value: &str) -> Self {
        if value == "percentage" {
            Self::Percentage
        } else {
            Self::Fixed
        }
    }
}

/// A stored discount code. Codes are uppercase; `discount_value` is a
/// percentage for [`DiscountType::Percentage`] and centavos for
/// [`DiscountType::Fixed`].
#[derive(Debug, Clone)]
pub struct Coupon {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Option<Money>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Why a coupon did not apply. Messages are the storefront's user-facing
/// strings; checks run in a fixed order and the first failure wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("Cupom invalido ou expirado")]
    NotFound,
    #[error("Cupom inativo")]
    Inactive,
    #[error("Cupom ainda nao esta valido")]
    NotYetValid,
    #[error("Cupom expirado")]
    Expired,
    #[error("Valor minimo nao atingido")]
    MinimumNotMet,
    #[error("Cupom esgotado")]
    UsesExhausted,
}

/// A successful validation: what the storefront echoes back plus the
/// computed discount. The amount is never negative; clamping against the
/// subtotal is the order aggregator's job.
#[derive(Debug, Clone, Serialize)]
pub struct CouponDiscount {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub discount_amount_cents: Money,
    pub description: Option<String>,
}

/// Runs the eligibility checks in order and computes the discount.
///
/// Validation reads `used_count` but never bumps it; usage is registered at
/// settlement, once payment is confirmed.
pub fn validate_coupon(
    coupon: Option<&Coupon>,
    now: DateTime<Utc>,
    subtotal: Money,
) -> Result<CouponDiscount, CouponError> {
    let coupon = coupon.ok_or(CouponError::NotFound)?;

    if !coupon.is_active {
        return Err(CouponError::Inactive);
    }
    if let Some(from) = coupon.valid_from {
        if now < from {
            return Err(CouponError::NotYetValid);
        }
    }
    if let Some(until) = coupon.valid_until {
        if now > until {
            return Err(CouponError::Expired);
        }
    }
    if let Some(min) = coupon.min_order_value {
        if min > Money::zero() && subtotal < min {
            return Err(CouponError::MinimumNotMet);
        }
    }
    if let Some(max) = coupon.max_uses {
        if coupon.used_count >= max {
            return Err(CouponError::UsesExhausted);
        }
    }

    let amount = match coupon.discount_type {
        DiscountType::Percentage => {
            Decimal::from(subtotal.cents()) * coupon.discount_value / Decimal::from(100)
        }
        DiscountType::Fixed => coupon.discount_value,
    };
    let cents = amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0);

    Ok(CouponDiscount {
        code: coupon.code.clone(),
        discount_type: coupon.discount_type,
        discount_value: coupon.discount_value,
        discount_amount_cents: Money::from_cents(cents).clamp_non_negative(),
        description: coupon.description.clone(),
    })
}
