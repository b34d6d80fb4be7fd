//! Coupon back office and the public validation endpoint.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::db::{self, CouponRow};
use crate::domain::coupon::{validate_coupon, CouponDiscount, CouponError, DiscountType};
use crate::domain::money::Money;
use crate::error::{internal, is_unique_violation, not_found, unprocessable, ApiError};
use crate::AppState;

pub async fn list(State(s): State<AppState>) -> Result<Json<Vec<CouponRow>>, ApiError> {
    let coupons =
        sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons ORDER BY created_at DESC")
            .fetch_all(&s.db)
            .await
            .map_err(internal)?;
    Ok(Json(coupons))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CouponPayload {
    #[validate(length(min = 2, max = 50))]
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Option<i64>,
    pub max_uses: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl CouponPayload {
    fn check(&self) -> Result<String, ApiError> {
        self.validate().map_err(|e| unprocessable(e.to_string()))?;
        if self.discount_value < Decimal::ZERO {
            return Err(unprocessable("Valor de desconto invalido"));
        }
        if matches!(self.min_order_value, Some(v) if v < 0) {
            return Err(unprocessable("Valor minimo invalido"));
        }
        if matches!(self.max_uses, Some(v) if v <= 0) {
            return Err(unprocessable("Limite de usos invalido"));
        }
        Ok(self.code.trim().to_uppercase())
    }
}

pub async fn create(
    State(s): State<AppState>,
    Json(r): Json<CouponPayload>,
) -> Result<(StatusCode, Json<CouponRow>), ApiError> {
    let code = r.check()?;

    if db::find_coupon_by_code(&s.db, &code).await.map_err(internal)?.is_some() {
        return Err((StatusCode::CONFLICT, "Cupom ja existe".to_string()));
    }

    let coupon = sqlx::query_as::<_, CouponRow>(
        "INSERT INTO coupons
           (id, code, description, discount_type, discount_value, min_order_value,
            max_uses, used_count, valid_from, valid_until, is_active, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $9, $10, NOW())
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&code)
    .bind(&r.description)
    .bind(r.discount_type.as_str())
    .bind(r.discount_value)
    .bind(r.min_order_value)
    .bind(r.max_uses)
    .bind(r.valid_from)
    .bind(r.valid_until)
    .bind(r.is_active.unwrap_or(true))
    .fetch_one(&s.db)
    .await
    .map_err(internal)?;

    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<CouponPayload>,
) -> Result<Json<CouponRow>, ApiError> {
    let code = r.check()?;

    let coupon = sqlx::query_as::<_, CouponRow>(
        "UPDATE coupons
         SET code = $2, description = $3, discount_type = $4, discount_value = $5,
             min_order_value = $6, max_uses = $7, valid_from = $8, valid_until = $9,
             is_active = $10
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&code)
    .bind(&r.description)
    .bind(r.discount_type.as_str())
    .bind(r.discount_value)
    .bind(r.min_order_value)
    .bind(r.max_uses)
    .bind(r.valid_from)
    .bind(r.valid_until)
    .bind(r.is_active.unwrap_or(true))
    .fetch_optional(&s.db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            (StatusCode::CONFLICT, "Cupom ja existe".to_string())
        } else {
            internal(e)
        }
    })?
    .ok_or_else(|| not_found("cupom"))?;

    Ok(Json(coupon))
}

pub async fn remove(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    sqlx::query("DELETE FROM coupons WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
    pub subtotal_cents: i64,
}

/// Public storefront check. Each failure reason maps to its own status and
/// the exact message the checkout page shows.
pub async fn validate(
    State(s): State<AppState>,
    Json(r): Json<ValidateRequest>,
) -> Result<Json<CouponDiscount>, ApiError> {
    let row = db::find_coupon_by_code(&s.db, &r.code).await.map_err(internal)?;
    let coupon = row.map(Into::into);
    let subtotal = Money::from_cents(r.subtotal_cents.max(0));

    match validate_coupon(coupon.as_ref(), Utc::now(), subtotal) {
        Ok(discount) => Ok(Json(discount)),
        Err(err) => Err((status_for(err), err.to_string())),
    }
}

fn status_for(err: CouponError) -> StatusCode {
    match err {
        CouponError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::FORBIDDEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(CouponError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(CouponError::Expired), StatusCode::FORBIDDEN);
        assert_eq!(status_for(CouponError::UsesExhausted), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_payload_normalizes_code() {
        let payload = CouponPayload {
            code: "  bemvindo10 ".into(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(10),
            min_order_value: None,
            max_uses: None,
            valid_from: None,
            valid_until: None,
            is_active: None,
        };
        assert_eq!(payload.check().unwrap(), "BEMVINDO10");
    }

    #[test]
    fn test_payload_rejects_negative_value() {
        let payload = CouponPayload {
            code: "DEZ".into(),
            description: None,
            discount_type: DiscountType::Fixed,
            discount_value: Decimal::from(-100),
            min_order_value: None,
            max_uses: None,
            valid_from: None,
            valid_until: None,
            is_active: None,
        };
        assert!(payload.check().is_err());
    }
}
