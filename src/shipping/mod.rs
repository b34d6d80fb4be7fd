//! Shipping quotes.
//!
//! A quote comes from the courier chain ([`engine::QuoteEngine`]) or, when no
//! courier answers, from the manual rate table below. The manual branch does
//! no I/O and cannot fail, so resolving a quote is total.

pub mod distance;
pub mod engine;

use serde::{Deserialize, Serialize};

use crate::domain::money::Money;

pub use distance::DistanceClient;
pub use engine::{CourierEndpoint, QuoteEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Uber,
    Ifood,
    Manual,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uber => "uber",
            Self::Ifood => "ifood",
            Self::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuote {
    pub provider: Provider,
    pub fee_cents: Money,
    pub eta_minutes: Option<i64>,
    pub distance_km: f64,
}

/// Fallback fee table, overridable from the environment.
#[derive(Debug, Clone, Copy)]
pub struct ManualRates {
    pub base_fee_cents: i64,
    pub per_km_cents: i64,
}

impl Default for ManualRates {
    fn default() -> Self {
        Self { base_fee_cents: 1090, per_km_cents: 290 }
    }
}

/// Deterministic last-resort quote: base fee plus a per-kilometer rate.
pub fn manual_quote(rates: ManualRates, distance_km: f64) -> ShippingQuote {
    let fee = (rates.base_fee_cents as f64 + rates.per_km_cents as f64 * distance_km).round();
    ShippingQuote {
        provider: Provider::Manual,
        fee_cents: Money::from_cents(fee as i64).clamp_non_negative(),
        eta_minutes: None,
        distance_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_quote_reference_values() {
        let q = manual_quote(ManualRates::default(), 5.0);
        assert_eq!(q.provider, Provider::Manual);
        assert_eq!(q.fee_cents.cents(), 2540); // 1090 + 5 * 290
        assert_eq!(q.eta_minutes, None);
        assert_eq!(q.distance_km, 5.0);
    }

    #[test]
    fn test_manual_quote_zero_distance_is_base_fee() {
        let q = manual_quote(ManualRates::default(), 0.0);
        assert_eq!(q.fee_cents.cents(), 1090);
    }

    #[test]
    fn test_manual_quote_rounds_fractional_distance() {
        // 1090 + 2,5 * 290 = 1815
        let q = manual_quote(ManualRates::default(), 2.5);
        assert_eq!(q.fee_cents.cents(), 1815);
        // 1090 + 0,33 * 290 = 1185,7 -> 1186
        let q = manual_quote(ManualRates::default(), 0.33);
        assert_eq!(q.fee_cents.cents(), 1186);
    }

    #[test]
    fn test_manual_quote_custom_rates() {
        let rates = ManualRates { base_fee_cents: 500, per_km_cents: 100 };
        assert_eq!(manual_quote(rates, 10.0).fee_cents.cents(), 1500);
    }

    #[test]
    fn test_provider_tags() {
        assert_eq!(Provider::Uber.as_str(), "uber");
        assert_eq!(Provider::Ifood.as_str(), "ifood");
        assert_eq!(Provider::Manual.as_str(), "manual");
        let json = serde_json::to_string(&Provider::Manual).expect("serialize");
        assert_eq!(json, "\"manual\"");
    }
}
