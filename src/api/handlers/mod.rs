//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Admin-only handlers.
pub mod admin;
/// Authentication handlers (register, login, refresh, logout, me).
pub mod auth;
/// Practice session listing with access checks.
pub mod sessions;

use crate::types::AppError;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
};
use serde_json::{Value, json};

/// JSON body extractor whose rejections use the standard error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Query string extractor whose rejections use the standard error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "system"
)]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
