//! granel-store - Self-hosted bulk-goods storefront and back office

use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use granel_store::config::AppConfig;
use granel_store::payments::MercadoPagoClient;
use granel_store::shipping::{DistanceClient, QuoteEngine};
use granel_store::{routes, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    // One outbound client for every provider; the timeout bounds the whole
    // quote fallback chain.
    let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::warn!(error = %err, "NATS unavailable, order events disabled");
                None
            }
        },
        None => None,
    };

    let state = AppState {
        db,
        quotes: QuoteEngine::new(http.clone(), config.courier_chain(), config.shipping_rates),
        distance: DistanceClient::new(
            http.clone(),
            config.google_maps_api_key.clone(),
            config.store_lat,
            config.store_lng,
        ),
        mercadopago: MercadoPagoClient::new(
            http,
            config.mercadopago_access_token.clone(),
            config.mercadopago_webhook_url.clone(),
        ),
        nats,
        config: config.clone(),
    };

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("granel-store listening on 0.0.0.0:{}", config.port);
    axum::serve(listener, app).await?;
    Ok(())
}
