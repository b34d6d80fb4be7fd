//! Courier quote chain.
//!
//! Providers are tried strictly in configuration order; the first parseable
//! quote wins and later providers are not contacted. Every transport error,
//! non-2xx status or malformed body counts as "unavailable" and falls through
//! to the next provider, ending at the manual rate table.

use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::shipping::{manual_quote, ManualRates, Provider, ShippingQuote};

/// One courier API, selected by static configuration. Absent credentials
/// mean the provider is simply not in the chain.
#[derive(Debug, Clone)]
pub struct CourierEndpoint {
    pub provider: Provider,
    pub url: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
struct QuoteRequest {
    distance_km: f64,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    fee_cents: i64,
    #[serde(default)]
    eta_minutes: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct QuoteEngine {
    http: reqwest::Client,
    couriers: Vec<CourierEndpoint>,
    manual: ManualRates,
}

impl QuoteEngine {
    pub fn new(
        http: reqwest::Client,
        couriers: Vec<CourierEndpoint>,
        manual: ManualRates,
    ) -> Self {
        Self { http, couriers, manual }
    }

    /// Resolves a quote for the distance. Never fails: the manual rate table
    /// is the terminal fallback.
    pub async fn resolve(&self, distance_km: f64) -> ShippingQuote {
        for courier in &self.couriers {
            if let Some(quote) = self.courier_quote(courier, distance_km).await {
                return quote;
            }
        }
        manual_quote(self.manual, distance_km)
    }

    async fn courier_quote(
        &self,
        courier: &CourierEndpoint,
        distance_km: f64,
    ) -> Option<ShippingQuote> {
        let response = self
            .http
            .post(&courier.url)
            .bearer_auth(&courier.token)
            .json(&QuoteRequest { distance_km })
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(
                    provider = courier.provider.as_str(),
                    status = %r.status(),
                    "courier quote rejected"
                );
                return None;
            }
            Err(err) => {
                tracing::warn!(
                    provider = courier.provider.as_str(),
                    error = %err,
                    "courier quote unavailable"
                );
                return None;
            }
        };

        match response.json::<QuoteResponse>().await {
            Ok(body) => Some(ShippingQuote {
                provider: courier.provider,
                fee_cents: Money::from_cents(body.fee_cents).clamp_non_negative(),
                eta_minutes: body.eta_minutes,
                distance_km,
            }),
            Err(err) => {
                tracing::warn!(
                    provider = courier.provider.as_str(),
                    error = %err,
                    "courier quote unparseable"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn engine(couriers: Vec<CourierEndpoint>) -> QuoteEngine {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .expect("client");
        QuoteEngine::new(http, couriers, ManualRates::default())
    }

    #[tokio::test]
    async fn test_no_couriers_resolves_manual() {
        let quote = engine(vec![]).resolve(5.0).await;
        assert_eq!(quote, manual_quote(ManualRates::default(), 5.0));
    }

    #[tokio::test]
    async fn test_unreachable_couriers_degrade_to_manual() {
        // Both endpoints are configured but refuse connections; the result
        // must equal the manual quote for the same distance.
        let couriers = vec![
            CourierEndpoint {
                provider: Provider::Uber,
                url: "http://127.0.0.1:1/quotes".into(),
                token: "t1".into(),
            },
            CourierEndpoint {
                provider: Provider::Ifood,
                url: "http://127.0.0.1:1/quotes".into(),
                token: "t2".into(),
            },
        ];
        let quote = engine(couriers).resolve(3.0).await;
        assert_eq!(quote.provider, Provider::Manual);
        assert_eq!(quote, manual_quote(ManualRates::default(), 3.0));
    }

    #[test]
    fn test_quote_response_tolerates_missing_eta() {
        let body: QuoteResponse =
            serde_json::from_str(r#"{"fee_cents": 1800}"#).expect("parse");
        assert_eq!(body.fee_cents, 1800);
        assert_eq!(body.eta_minutes, None);
    }
}
