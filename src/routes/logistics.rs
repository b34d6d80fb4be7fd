//! Dispatch: re-quotes the order's stored distance and marks it dispatched.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db;
use crate::domain::events::{self, OrderEvent};
use crate::error::{internal, not_found, ApiError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub order_id: Uuid,
}

pub async fn dispatch(
    State(s): State<AppState>,
    Json(r): Json<DispatchRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(order) = db::find_order(&s.db, r.order_id).await.map_err(internal)? else {
        return Err(not_found("pedido"));
    };

    let quote = s.quotes.resolve(order.distance_km).await;
    db::mark_order_dispatched(&s.db, order.id, quote.fee_cents, quote.provider.as_str())
        .await
        .map_err(internal)?;

    events::publish(
        s.nats.as_ref(),
        &OrderEvent::Dispatched {
            order_id: order.id,
            provider: quote.provider.as_str().to_string(),
            fee_cents: quote.fee_cents.cents(),
        },
    )
    .await;

    tracing::info!(
        order_id = %order.id,
        provider = quote.provider.as_str(),
        fee_cents = quote.fee_cents.cents(),
        "order dispatched"
    );
    Ok(Json(json!({"ok": true, "provider": quote.provider})))
}
