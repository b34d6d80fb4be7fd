//! Handler error helpers. Route handlers answer `(StatusCode, String)`;
//! these keep the mapping in one place.

use axum::http::StatusCode;

pub type ApiError = (StatusCode, String);

pub fn internal<E: std::fmt::Display>(err: E) -> ApiError {
    tracing::error!(error = %err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

pub fn not_found(what: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{what} nao encontrado"))
}

pub fn unprocessable(message: impl Into<String>) -> ApiError {
    (StatusCode::UNPROCESSABLE_ENTITY, message.into())
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
}
