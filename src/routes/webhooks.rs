//! Payment confirmation webhooks.
//!
//! Two provider-specific shells around the same settlement call. Responses
//! are deliberately non-retryable: unknown orders and replays are
//! acknowledged with 200 so the provider stops redelivering; only a bad
//! signature (401) or a persistence failure (500) is an error.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::money::Money;
use crate::error::{internal, ApiError};
use crate::payments::signature;
use crate::settlement::{settle_order, SettlementOutcome};
use crate::AppState;

const SIGNATURE_HEADER: &str = "x-signature";
const TIMESTAMP_HEADER: &str = "x-timestamp";

#[derive(Debug, Deserialize)]
struct MercadoPagoPayload {
    #[serde(default)]
    #[allow(dead_code)]
    data: Option<MercadoPagoData>,
    #[serde(default)]
    order_id: Option<Uuid>,
    #[serde(default)]
    net_value_cents: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MercadoPagoData {
    #[serde(default)]
    #[allow(dead_code)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EfiPayload {
    #[serde(default)]
    order_id: Option<Uuid>,
    #[serde(default)]
    net_value_cents: Option<i64>,
}

/// Signature gate: enforced only when the secret is configured and the
/// provider sent a signature header. A signature without a timestamp, or a
/// digest that does not match `"{timestamp}.{body}"`, is rejected.
fn signature_ok(
    secret: Option<&str>,
    sig: Option<&str>,
    timestamp: Option<&str>,
    body: &str,
) -> bool {
    let (Some(secret), Some(sig)) = (secret, sig) else {
        return true;
    };
    let Some(timestamp) = timestamp else {
        return false;
    };
    signature::verify(secret, timestamp, body, sig)
}

fn check_signature(state: &AppState, headers: &HeaderMap, body: &str) -> Result<(), ApiError> {
    let sig = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok());
    if signature_ok(state.config.webhook_secret.as_deref(), sig, timestamp, body) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "Assinatura invalida".to_string()))
    }
}

async fn settle(
    state: &AppState,
    order_id: Option<Uuid>,
    net_value_cents: Option<i64>,
) -> Result<Json<Value>, ApiError> {
    let Some(order_id) = order_id else {
        return Ok(Json(json!({"ok": true, "ignored": true})));
    };
    let net_value = Money::from_cents(net_value_cents.unwrap_or(0));

    match settle_order(&state.db, state.nats.as_ref(), order_id, net_value).await {
        Ok(SettlementOutcome::Settled) => Ok(Json(json!({"ok": true}))),
        Ok(SettlementOutcome::AlreadySettled) => {
            Ok(Json(json!({"ok": true, "idempotent": true})))
        }
        Ok(SettlementOutcome::OrderNotFound) => Ok(Json(json!({"ok": true, "ignored": true}))),
        Err(err) => Err(internal(err)),
    }
}

pub async fn mercadopago(
    State(s): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, ApiError> {
    check_signature(&s, &headers, &body)?;

    let Ok(payload) = serde_json::from_str::<MercadoPagoPayload>(&body) else {
        tracing::warn!("mercadopago webhook with unparseable body");
        return Ok(Json(json!({"ok": true, "ignored": true})));
    };
    settle(&s, payload.order_id, payload.net_value_cents).await
}

pub async fn efi(
    State(s): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, ApiError> {
    check_signature(&s, &headers, &body)?;

    let Ok(payload) = serde_json::from_str::<EfiPayload>(&body) else {
        tracing::warn!("efi webhook with unparseable body");
        return Ok(Json(json!({"ok": true, "ignored": true})));
    };
    settle(&s, payload.order_id, payload.net_value_cents).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_skipped_without_secret() {
        assert!(signature_ok(None, Some("deadbeef"), Some("123"), "{}"));
    }

    #[test]
    fn test_signature_skipped_without_header() {
        assert!(signature_ok(Some("segredo"), None, None, "{}"));
    }

    #[test]
    fn test_signature_requires_timestamp() {
        assert!(!signature_ok(Some("segredo"), Some("deadbeef"), None, "{}"));
    }

    #[test]
    fn test_signature_round_trip() {
        let body = r#"{"order_id":"0188a1b2-0000-7000-8000-000000000001"}"#;
        let sig = signature::sign("segredo", "1700000000", body);
        assert!(signature_ok(Some("segredo"), Some(&sig), Some("1700000000"), body));
        assert!(!signature_ok(Some("segredo"), Some(&sig), Some("1700000001"), body));
        assert!(!signature_ok(Some("outro"), Some(&sig), Some("1700000000"), body));
    }

    #[test]
    fn test_mercadopago_payload_unwrapping() {
        let payload: MercadoPagoPayload = serde_json::from_str(
            r#"{"data": {"id": "pay_123"},
                "order_id": "0188a1b2-0000-7000-8000-000000000001",
                "net_value_cents": 10305}"#,
        )
        .expect("parse");
        assert!(payload.order_id.is_some());
        assert_eq!(payload.net_value_cents, Some(10305));
    }

    #[test]
    fn test_mercadopago_payload_without_order() {
        let payload: MercadoPagoPayload =
            serde_json::from_str(r#"{"data": {"id": "pay_123"}}"#).expect("parse");
        assert!(payload.order_id.is_none());
    }

    #[test]
    fn test_efi_payload_unwrapping() {
        let payload: EfiPayload = serde_json::from_str(
            r#"{"order_id": "0188a1b2-0000-7000-8000-000000000001", "net_value_cents": 870}"#,
        )
        .expect("parse");
        assert_eq!(payload.net_value_cents, Some(870));
    }
}
