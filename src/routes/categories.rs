//! Category management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{internal, is_unique_violation, not_found, unprocessable, ApiError};
use crate::AppState;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

pub async fn list(State(s): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT * FROM categories WHERE active = TRUE ORDER BY sort_order, name",
    )
    .fetch_all(&s.db)
    .await
    .map_err(internal)?;
    Ok(Json(categories))
}

pub async fn get(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&s.db)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("categoria"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub active: Option<bool>,
}

pub async fn create(
    State(s): State<AppState>,
    Json(r): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    r.validate().map_err(|e| unprocessable(e.to_string()))?;
    let slug = r.name.trim().to_lowercase().replace(' ', "-");

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug, description, sort_order, active, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, NOW())
         RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&r.name)
    .bind(&slug)
    .bind(&r.description)
    .bind(r.sort_order.unwrap_or(0))
    .bind(r.active.unwrap_or(true))
    .fetch_one(&s.db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            (StatusCode::CONFLICT, "Categoria ja existe".to_string())
        } else {
            internal(e)
        }
    })?;

    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
    Json(r): Json<CategoryPayload>,
) -> Result<Json<Category>, ApiError> {
    r.validate().map_err(|e| unprocessable(e.to_string()))?;

    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories
         SET name = $2, description = $3, sort_order = $4, active = $5
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(&r.name)
    .bind(&r.description)
    .bind(r.sort_order.unwrap_or(0))
    .bind(r.active.unwrap_or(true))
    .fetch_optional(&s.db)
    .await
    .map_err(internal)?
    .ok_or_else(|| not_found("categoria"))?;

    Ok(Json(category))
}

/// Hard delete; products in the category fall back to uncategorized via
/// `ON DELETE SET NULL`.
pub async fn remove(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&s.db)
        .await
        .map_err(internal)?;
    Ok(StatusCode::NO_CONTENT)
}
