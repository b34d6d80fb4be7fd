//! granel-store: self-hosted bulk-goods storefront.
//!
//! ## Features
//! - Catalog sold by weight (per-kilogram prices, tiered weight discounts)
//! - Session carts and checkout with Pix/card hand-off
//! - Coupons with eligibility rules and usage limits
//! - Shipping quotes from a prioritized courier chain with a manual fallback
//! - Post-payment settlement: stock draw-down and revenue-box bookkeeping

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod payments;
pub mod routes;
pub mod settlement;
pub mod shipping;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::payments::MercadoPagoClient;
use crate::shipping::{DistanceClient, QuoteEngine};

/// Shared per-request context. Every collaborator is injected here at
/// startup; no module holds its own lazy client.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub quotes: QuoteEngine,
    pub distance: DistanceClient,
    pub mercadopago: MercadoPagoClient,
    pub nats: Option<async_nats::Client>,
    pub config: AppConfig,
}
