//! Shipping quote endpoint. Always answers 200: provider failures degrade
//! down the courier chain and end at the manual rate table.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::shipping::ShippingQuote;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub address: String,
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: ShippingQuote,
    pub address: String,
}

pub async fn quote(
    State(s): State<AppState>,
    Json(r): Json<QuoteRequest>,
) -> Json<QuoteResponse> {
    let distance_km = s.distance.distance_km(r.location.lat, r.location.lng).await;
    let quote = s.quotes.resolve(distance_km).await;
    Json(QuoteResponse { quote, address: r.address })
}
