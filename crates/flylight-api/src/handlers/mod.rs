//! # Request Handlers
//!
//! Axum request handlers, one module per resource. Admin handlers take an
//! [`AdminContext`](crate::auth::AdminContext) produced by the admin gate.

pub mod admin;
pub mod auth;
pub mod brackets;
pub mod orders;
pub mod payments;
pub mod products;
pub mod tournaments;

use crate::error::Json;
use axum::response::IntoResponse;
use serde::{Deserialize, Deserializer};

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "flylight",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// `{"message": ...}` body
pub(crate) fn message(text: impl Into<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": text.into() }))
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
