//! Product catalog: storefront listing plus back-office CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::money::Money;
use crate::error::{internal, is_unique_violation, not_found, unprocessable, ApiError};
use crate::routes::{ListParams, PaginatedResponse};
use crate::AppState;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price_per_kg_cents: Money,
    pub cost_per_kg_cents: Option<Money>,
    pub margin_pct: Option<Decimal>,
    pub stock_grams: i64,
    pub reorder_point_grams: Option<i64>,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn list(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<Product>>, ApiError> {
    let (page, limit, offset) = p.pagination();
    let search: Option<String> =
        p.search.as_deref().map(str::trim).filter(|q| !q.is_empty()).map(String::from);

    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products
         WHERE active = TRUE
           AND ($1::uuid IS NULL OR category_id = $1)
           AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
         ORDER BY created_at DESC
         LIMIT $3 OFFSET $4",
    )
    .bind(p.category)
    .bind(search.clone())
    .bind(limit)
    .bind(offset)
    .fetch_all(&s.db)
    .await
    .map_err(internal)?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products
         WHERE active = TRUE
           AND ($1::uuid IS NULL OR category_id = $1)
           AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')",
    )
    .bind(p.category)
    .bind(search)
    .fetch_one(&s.db)
    .await
    .map_err(internal)?;

    Ok(Json(PaginatedResponse { data: products, total: total.0, page }))
}

pub async fn get(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("produto"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub price_per_kg_cents: i64,
    pub cost_per_kg_cents: Option<i64>,
    pub margin_pct: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock_grams: i64,
    pub reorder_point_grams: Option<i64>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

pub async fn create(
    State(s): State<AppState>,
    Json(r): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    r.validate().map_err(|e| unprocessable(e.to_string()))?;

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products
           (id, name, slug, description, category_id, price_per_kg_cents,
            cost_per_kg_cents, margin_pct, stock_grams, reorder_point_grams,
            image_url, active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW(), NOW())
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(slugify(&r.name))
    .bind(&r.description)
    .bind(r.category_id)
    .bind(r.price_per_kg_cents)
    .bind(r.cost_per_kg_cents)
    .bind(r.margin_pct)
    .bind(r.stock_grams)
    .bind(r.reorder_point_grams)
    .bind(&r.image_url)
    .bind(r.active.unwrap_or(true))
    .fetch_one(&s.db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            (StatusCode::CONFLICT, "Produto ja existe".to_string())
        } else {
            internal(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<ProductPayload>,
) -> Result<Json<Product>, ApiError> {
    r.validate().map_err(|e| unprocessable(e.to_string()))?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products
         SET name = $2, description = $3, category_id = $4, price_per_kg_cents = $5,
             cost_per_kg_cents = $6, margin_pct = $7, stock_grams = $8,
             reorder_point_grams = $9, image_url = $10, active = $11, updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(&r.description)
    .bind(r.category_id)
    .bind(r.price_per_kg_cents)
    .bind(r.cost_per_kg_cents)
    .bind(r.margin_pct)
    .bind(r.stock_grams)
    .bind(r.reorder_point_grams)
    .bind(&r.image_url)
    .bind(r.active.unwrap_or(true))
    .fetch_optional(&s.db)
    .await
    .map_err(internal)?
    .ok_or_else(|| not_found("produto"))?;

    Ok(Json(product))
}

/// Soft delete: the product leaves the storefront but stays referenced by
/// past orders.
pub async fn remove(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    sqlx::query("UPDATE products SET active = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}
