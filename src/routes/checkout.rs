//! Checkout submission: prices the cart server-side, re-validates the
//! coupon, records the pending order and hands the buyer to the payment
//! gateway.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::domain::coupon::{validate_coupon, CouponError};
use crate::domain::money::Money;
use crate::domain::order::{compute_order_totals, OrderLine, OrderStatus};
use crate::error::{internal, unprocessable, ApiError};
use crate::shipping::ShippingQuote;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Pix,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::Card => "card",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    pub address: String,
    #[serde(default)]
    pub shipping: Option<ShippingQuote>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutItem {
    pub product_id: Uuid,
    pub price_per_kg_cents: i64,
    pub weight_grams: i64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    pub order_number: String,
    pub redirect_url: Option<String>,
}

pub async fn submit(
    State(s): State<AppState>,
    Json(r): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    if r.items.is_empty() {
        return Err(unprocessable("Carrinho vazio"));
    }

    let lines: Vec<OrderLine> = r
        .items
        .iter()
        .map(|item| OrderLine {
            product_id: item.product_id,
            price_per_kg_cents: Money::from_cents(item.price_per_kg_cents),
            weight_grams: item.weight_grams,
        })
        .collect();
    let subtotal: Money = lines.iter().map(OrderLine::line_total).sum();

    // A coupon that fails validation fails the checkout with its own
    // user-facing message; the storefront should have caught it earlier.
    let mut coupon_code = None;
    let mut discount = Money::zero();
    if let Some(code) = r.coupon_code.as_ref().filter(|c| !c.trim().is_empty()) {
        let row = db::find_coupon_by_code(&s.db, code).await.map_err(internal)?;
        let coupon = row.map(Into::into);
        match validate_coupon(coupon.as_ref(), Utc::now(), subtotal) {
            Ok(result) => {
                discount = result.discount_amount_cents;
                coupon_code = Some(result.code);
            }
            Err(err @ CouponError::NotFound) => {
                return Err((StatusCode::NOT_FOUND, err.to_string()))
            }
            Err(err) => return Err(unprocessable(err.to_string())),
        }
    }

    let shipping_fee = r
        .shipping
        .as_ref()
        .map(|q| q.fee_cents)
        .unwrap_or(Money::zero());
    let totals = compute_order_totals(&lines, discount, shipping_fee);

    let order_id = Uuid::now_v7();
    let order_number = format!("PED-{:08}", rand::random::<u32>());

    sqlx::query(
        "INSERT INTO orders
           (id, order_number, status, subtotal_cents, discount_cents, shipping_cents,
            total_cents, coupon_code, address, shipping_provider, distance_km,
            eta_minutes, payment_method, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW())",
    )
    .bind(order_id)
    .bind(&order_number)
    .bind(OrderStatus::Pending.as_str())
    .bind(totals.subtotal_cents)
    .bind(totals.discount_cents)
    .bind(totals.shipping_cents)
    .bind(totals.total_cents)
    .bind(&coupon_code)
    .bind(&r.address)
    .bind(r.shipping.as_ref().map(|q| q.provider.as_str()))
    .bind(r.shipping.as_ref().map(|q| q.distance_km).unwrap_or(0.0))
    .bind(r.shipping.as_ref().and_then(|q| q.eta_minutes))
    .bind(r.payment_method.as_str())
    .execute(&s.db)
    .await
    .map_err(internal)?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO order_items
               (id, order_id, product_id, weight_grams, price_per_kg_cents, line_total_cents)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::now_v7())
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.weight_grams)
        .bind(line.price_per_kg_cents)
        .bind(line.line_total())
        .execute(&s.db)
        .await
        .map_err(internal)?;
    }

    let redirect_url = match r.payment_method {
        PaymentMethod::Pix => {
            s.mercadopago
                .create_pix_payment(order_id, totals.total_cents, &format!("Pedido {order_number}"))
                .await
        }
        PaymentMethod::Card => s.config.efi_checkout_url.clone(),
    }
    .or_else(|| Some("/checkout?status=pending".to_string()));

    tracing::info!(
        %order_id,
        order_number,
        total_cents = totals.total_cents.cents(),
        method = r.payment_method.as_str(),
        "order created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse { order_id, order_number, redirect_url }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_format() {
        let method: PaymentMethod = serde_json::from_str("\"pix\"").expect("parse");
        assert_eq!(method, PaymentMethod::Pix);
        let method: PaymentMethod = serde_json::from_str("\"card\"").expect("parse");
        assert_eq!(method, PaymentMethod::Card);
        assert!(serde_json::from_str::<PaymentMethod>("\"boleto\"").is_err());
    }

    #[test]
    fn test_checkout_request_parsing_with_optional_fields() {
        let body = r#"{
            "items": [{"product_id": "0188a1b2-0000-7000-8000-000000000001",
                       "price_per_kg_cents": 8990, "weight_grams": 500}],
            "address": "Rua Augusta, 500",
            "payment_method": "pix"
        }"#;
        let request: CheckoutRequest = serde_json::from_str(body).expect("parse");
        assert!(request.shipping.is_none());
        assert!(request.coupon_code.is_none());
        assert_eq!(request.items.len(), 1);
    }
}
