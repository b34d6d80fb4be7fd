//! Shared persistence operations.
//!
//! CRUD that belongs to a single endpoint lives next to its handler; the
//! queries here are shared between checkout, settlement and dispatch, or
//! must stay single-statement so concurrent settlements cannot race
//! (stock decrement, coupon usage).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::coupon::{Coupon, DiscountType};
use crate::domain::finance::FinanceBox;
use crate::domain::money::Money;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CouponRow {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_order_value: Option<i64>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Coupon {
            code: row.code,
            description: row.description,
            discount_type: DiscountType::from_db(&row.discount_type),
            discount_value: row.discount_value,
            min_order_value: row.min_order_value.map(Money::from_cents),
            max_uses: row.max_uses,
            used_count: row.used_count,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub status: String,
    pub subtotal_cents: Money,
    pub discount_cents: Money,
    pub shipping_cents: Money,
    pub total_cents: Money,
    pub coupon_code: Option<String>,
    pub address: String,
    pub shipping_provider: Option<String>,
    pub distance_km: f64,
    pub eta_minutes: Option<i64>,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub weight_grams: i64,
    pub price_per_kg_cents: Money,
    pub line_total_cents: Money,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FinanceBoxRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub box_key: String,
    pub amount_cents: Money,
    pub created_at: DateTime<Utc>,
}

pub async fn find_coupon_by_code(pool: &PgPool, code: &str) -> sqlx::Result<Option<CouponRow>> {
    let normalized = code.trim().to_uppercase();
    sqlx::query_as::<_, CouponRow>("SELECT * FROM coupons WHERE upper(code) = $1")
        .bind(&normalized)
        .fetch_optional(pool)
        .await
}

pub async fn find_order(pool: &PgPool, order_id: Uuid) -> sqlx::Result<Option<OrderRow>> {
    sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_order_items(pool: &PgPool, order_id: Uuid) -> sqlx::Result<Vec<OrderItemRow>> {
    sqlx::query_as::<_, OrderItemRow>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

pub async fn fetch_finance_boxes(
    pool: &PgPool,
    order_id: Uuid,
) -> sqlx::Result<Vec<FinanceBoxRow>> {
    sqlx::query_as::<_, FinanceBoxRow>(
        "SELECT * FROM finance_boxes WHERE order_id = $1 ORDER BY box_key",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}

/// The settlement gate: flips `pending -> paid` and reports whether this
/// call won the transition. A redelivered webhook sees zero rows affected
/// and skips every side effect.
pub async fn mark_order_paid(pool: &PgPool, order_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE orders SET status = 'paid', updated_at = NOW()
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(order_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Atomic, clamped stock decrement. Single statement so concurrent
/// settlements on the same product cannot lose updates, and the floor keeps
/// stock from ever going negative.
pub async fn decrement_stock(pool: &PgPool, product_id: Uuid, grams: i64) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE products
         SET stock_grams = GREATEST(stock_grams - $2, 0), updated_at = NOW()
         WHERE id = $1",
    )
    .bind(product_id)
    .bind(grams)
    .execute(pool)
    .await?;
    Ok(())
}

/// Inserts the revenue split for an order. `ON CONFLICT DO NOTHING` makes a
/// raced duplicate settlement a no-op per box.
pub async fn insert_finance_boxes(
    pool: &PgPool,
    order_id: Uuid,
    boxes: &[FinanceBox],
) -> sqlx::Result<()> {
    for fbox in boxes {
        sqlx::query(
            "INSERT INTO finance_boxes (id, order_id, box_key, amount_cents)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (order_id, box_key) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(order_id)
        .bind(fbox.key.as_str())
        .bind(fbox.amount_cents)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Counts one use of a coupon, capped at `max_uses`.
pub async fn register_coupon_use(pool: &PgPool, code: &str) -> sqlx::Result<()> {
    sqlx::query(
        "UPDATE coupons SET used_count = used_count + 1
         WHERE upper(code) = $1
           AND (max_uses IS NULL OR used_count < max_uses)",
    )
    .bind(code.trim().to_uppercase())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn mark_order_dispatched(
    pool: &PgPool,
    order_id: Uuid,
    fee: Money,
    provider: &str,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE orders
         SET status = 'dispatched', shipping_cents = $2, shipping_provider = $3,
             updated_at = NOW()
         WHERE id = $1",
    )
    .bind(order_id)
    .bind(fee)
    .bind(provider)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupon_row_conversion() {
        let row = CouponRow {
            id: Uuid::new_v4(),
            code: "FRETEGRATIS".into(),
            description: None,
            discount_type: "percentage".into(),
            discount_value: Decimal::from(15),
            min_order_value: Some(2500),
            max_uses: Some(10),
            used_count: 3,
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: Utc::now(),
        };
        let coupon: Coupon = row.into();
        assert_eq!(coupon.discount_type, DiscountType::Percentage);
        assert_eq!(coupon.min_order_value, Some(Money::from_cents(2500)));
        assert_eq!(coupon.used_count, 3);
    }

    #[test]
    fn test_unknown_discount_type_reads_as_fixed() {
        assert_eq!(DiscountType::from_db("weird"), DiscountType::Fixed);
        assert_eq!(DiscountType::from_db("percentage"), DiscountType::Percentage);
    }
}
