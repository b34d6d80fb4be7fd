//! Session-keyed shopping cart.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::money::Money;
use crate::domain::pricing::price_line_cents;
use crate::error::{internal, not_found, unprocessable, ApiError};
use crate::AppState;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub session_id: String,
    pub product_id: Uuid,
    pub weight_grams: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CartLineRow {
    id: Uuid,
    product_id: Uuid,
    name: String,
    image_url: Option<String>,
    price_per_kg_cents: Money,
    weight_grams: i64,
}

/// A cart line priced for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub price_per_kg_cents: Money,
    pub weight_grams: i64,
    pub line_total_cents: Money,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub items: Vec<CartLine>,
    pub subtotal_cents: Money,
}

pub async fn list(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        "SELECT c.id, c.product_id, p.name, p.image_url, p.price_per_kg_cents, c.weight_grams
         FROM cart_items c
         JOIN products p ON p.id = c.product_id
         WHERE c.session_id = $1
         ORDER BY c.created_at",
    )
    .bind(&session)
    .fetch_all(&s.db)
    .await
    .map_err(internal)?;

    let items: Vec<CartLine> = rows
        .into_iter()
        .map(|row| {
            let line_total = price_line_cents(row.price_per_kg_cents, row.weight_grams);
            CartLine {
                id: row.id,
                product_id: row.product_id,
                name: row.name,
                image_url: row.image_url,
                price_per_kg_cents: row.price_per_kg_cents,
                weight_grams: row.weight_grams,
                line_total_cents: line_total,
            }
        })
        .collect();
    let subtotal = items.iter().map(|i| i.line_total_cents).sum();

    Ok(Json(CartResponse { items, subtotal_cents: subtotal }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub weight_grams: i64,
}

/// Re-adding a product merges weights into the existing line.
pub async fn add(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(r): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    r.validate().map_err(|e| unprocessable(e.to_string()))?;

    let item = sqlx::query_as::<_, CartItem>(
        "INSERT INTO cart_items (id, session_id, product_id, weight_grams, created_at)
         VALUES ($1, $2, $3, $4, NOW())
         ON CONFLICT (session_id, product_id)
         DO UPDATE SET weight_grams = cart_items.weight_grams + EXCLUDED.weight_grams
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&session)
    .bind(r.product_id)
    .bind(r.weight_grams)
    .fetch_one(&s.db)
    .await
    .map_err(internal)?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateWeightRequest {
    #[validate(range(min = 1))]
    pub weight_grams: i64,
}

pub async fn update_weight(
    State(s): State<AppState>,
    Path((session, id)): Path<(String, Uuid)>,
    Json(r): Json<UpdateWeightRequest>,
) -> Result<Json<CartItem>, ApiError> {
    r.validate().map_err(|e| unprocessable(e.to_string()))?;

    sqlx::query_as::<_, CartItem>(
        "UPDATE cart_items SET weight_grams = $3
         WHERE id = $1 AND session_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(&session)
    .bind(r.weight_grams)
    .fetch_optional(&s.db)
    .await
    .map_err(internal)?
    .map(Json)
    .ok_or_else(|| not_found("item"))
}

pub async fn remove(
    State(s): State<AppState>,
    Path((session, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    sqlx::query("DELETE FROM cart_items WHERE id = $1 AND session_id = $2")
        .bind(id)
        .bind(&session)
        .execute(&s.db)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<StatusCode, ApiError> {
    sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(&session)
        .execute(&s.db)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}
