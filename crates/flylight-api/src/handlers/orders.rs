//! Customer orders.

use crate::error::{ApiError, ApiResult, Json};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use flylight_core::{NewOrder, Order};
use tracing::{info, instrument};

#[instrument(skip_all, fields(items = request.items.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<NewOrder>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let order = request.into_order()?;
    state.store.insert_order(&order).await?;

    info!("Order {} created ({} units)", order.id, order.item_count());
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "order_id": order.id,
            "message": "Order created, proceed to payment",
        })),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    state
        .store
        .find_order(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order not found"))
}
