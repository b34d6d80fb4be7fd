//! Back-office order views.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::db::{self, FinanceBoxRow, OrderItemRow, OrderRow};
use crate::error::{internal, not_found, ApiError};
use crate::routes::{ListParams, PaginatedResponse};
use crate::AppState;

pub async fn list(
    State(s): State<AppState>,
    Query(p): Query<ListParams>,
) -> Result<Json<PaginatedResponse<OrderRow>>, ApiError> {
    let (page, limit, offset) = p.pagination();

    let orders = sqlx::query_as::<_, OrderRow>(
        "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&s.db)
    .await
    .map_err(internal)?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&s.db)
        .await
        .map_err(internal)?;

    Ok(Json(PaginatedResponse { data: orders, total: total.0, page }))
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
    pub finance_boxes: Vec<FinanceBoxRow>,
}

pub async fn get(
    State(s): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>, ApiError> {
    let Some(order) = db::find_order(&s.db, id).await.map_err(internal)? else {
        return Err(not_found("pedido"));
    };
    let items = db::fetch_order_items(&s.db, id).await.map_err(internal)?;
    let finance_boxes = db::fetch_finance_boxes(&s.db, id).await.map_err(internal)?;

    Ok(Json(OrderDetail { order, items, finance_boxes }))
}
