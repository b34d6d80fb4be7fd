//! Environment configuration.
//!
//! Every external knob lives here. Missing provider credentials disable that
//! provider instead of failing startup; only the database URL is required.

use std::str::FromStr;

use crate::shipping::{CourierEndpoint, ManualRates, Provider};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub shipping_rates: ManualRates,
    pub uber_direct_url: Option<String>,
    pub uber_direct_token: Option<String>,
    pub ifood_url: Option<String>,
    pub ifood_token: Option<String>,
    pub google_maps_api_key: Option<String>,
    pub store_lat: f64,
    pub store_lng: f64,
    pub mercadopago_access_token: Option<String>,
    pub mercadopago_webhook_url: Option<String>,
    pub efi_checkout_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub nats_url: Option<String>,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env_opt(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        Ok(Self {
            database_url,
            port: env_parse("PORT", 8080),
            shipping_rates: ManualRates {
                base_fee_cents: env_parse("SHIPPING_BASE_FEE", 1090),
                per_km_cents: env_parse("SHIPPING_PER_KM", 290),
            },
            uber_direct_url: env_opt("UBER_DIRECT_API_URL"),
            uber_direct_token: env_opt("UBER_DIRECT_TOKEN"),
            ifood_url: env_opt("IFOOD_API_URL"),
            ifood_token: env_opt("IFOOD_API_TOKEN"),
            google_maps_api_key: env_opt("GOOGLE_MAPS_API_KEY"),
            store_lat: env_parse("STORE_LAT", -23.561684),
            store_lng: env_parse("STORE_LNG", -46.625378),
            mercadopago_access_token: env_opt("MERCADOPAGO_ACCESS_TOKEN"),
            mercadopago_webhook_url: env_opt("MERCADOPAGO_WEBHOOK_URL"),
            efi_checkout_url: env_opt("EFI_CHECKOUT_URL"),
            webhook_secret: env_opt("PAYMENT_WEBHOOK_SECRET"),
            nats_url: env_opt("NATS_URL"),
        })
    }

    /// Couriers in strict priority order: Uber Direct first, iFood second.
    /// A provider joins the chain only when both its URL and token are set.
    pub fn courier_chain(&self) -> Vec<CourierEndpoint> {
        let mut chain = Vec::new();
        if let (Some(url), Some(token)) = (&self.uber_direct_url, &self.uber_direct_token) {
            chain.push(CourierEndpoint {
                provider: Provider::Uber,
                url: url.clone(),
                token: token.clone(),
            });
        }
        if let (Some(url), Some(token)) = (&self.ifood_url, &self.ifood_token) {
            chain.push(CourierEndpoint {
                provider: Provider::Ifood,
                url: url.clone(),
                token: token.clone(),
            });
        }
        chain
    }
}
