//! HTTP surface. One module per resource; handlers follow the
//! `Result<Json<T>, (StatusCode, String)>` convention throughout.

pub mod cart;
pub mod categories;
pub mod checkout;
pub mod coupons;
pub mod logistics;
pub mod orders;
pub mod products;
pub mod shipping;
pub mod webhooks;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<Uuid>,
    pub search: Option<String>,
}

impl ListParams {
    /// `(page, per_page, offset)`; page >= 1, per_page capped at 100.
    pub fn pagination(&self) -> (u32, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).min(100);
        (page, per_page as i64, ((page - 1) * per_page) as i64)
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/products", get(products::list).post(products::create))
        .route(
            "/api/v1/products/:id",
            get(products::get).put(products::update).delete(products::remove),
        )
        .route("/api/v1/categories", get(categories::list).post(categories::create))
        .route(
            "/api/v1/categories/:id",
            get(categories::get).put(categories::update).delete(categories::remove),
        )
        .route("/api/v1/coupons", get(coupons::list).post(coupons::create))
        .route("/api/v1/coupons/validate", post(coupons::validate))
        .route("/api/v1/coupons/:id", axum::routing::put(coupons::update).delete(coupons::remove))
        .route("/api/v1/cart/:session", get(cart::list).post(cart::add).delete(cart::clear))
        .route(
            "/api/v1/cart/:session/items/:id",
            axum::routing::put(cart::update_weight).delete(cart::remove),
        )
        .route("/api/v1/shipping/quote", post(shipping::quote))
        .route("/api/v1/checkout", post(checkout::submit))
        .route("/api/v1/webhooks/mercadopago", post(webhooks::mercadopago))
        .route("/api/v1/webhooks/efi", post(webhooks::efi))
        .route("/api/v1/logistics/dispatch", post(logistics::dispatch))
        .route("/api/v1/orders", get(orders::list))
        .route("/api/v1/orders/:id", get(orders::get))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "granel-store"}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        let params = ListParams { page: None, per_page: None, category: None, search: None };
        assert_eq!(params.pagination(), (1, 20, 0));

        let params =
            ListParams { page: Some(0), per_page: Some(500), category: None, search: None };
        assert_eq!(params.pagination(), (1, 100, 0));

        let params =
            ListParams { page: Some(3), per_page: Some(25), category: None, search: None };
        assert_eq!(params.pagination(), (3, 25, 50));
    }
}
