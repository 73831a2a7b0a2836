//! Tournament brackets.

use super::message;
use crate::auth::AdminContext;
use crate::error::{ApiError, ApiResult, Json};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};
use flylight_core::Bracket;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct NewBracket {
    #[serde(default)]
    pub tournament_id: String,
    #[serde(default)]
    pub bracket_data: Option<serde_json::Value>,
}

pub async fn create_bracket(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Json(request): Json<NewBracket>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let tournament = state
        .store
        .find_tournament(&request.tournament_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tournament not found"))?;

    let bracket = Bracket::new(tournament.id, request.bracket_data);
    state.store.insert_bracket(&bracket).await?;

    info!("Bracket {} created for tournament {}", bracket.id, bracket.tournament_id);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": bracket.id,
            "message": "Bracket created successfully",
        })),
    ))
}

/// `id` is the tournament id
pub async fn get_bracket(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Bracket>> {
    state
        .store
        .find_bracket_for_tournament(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Bracket not found"))
}

#[derive(Debug, Deserialize)]
pub struct MatchUpdate {
    #[serde(rename = "match", default)]
    pub result: serde_json::Value,
}

/// `id` is the bracket id
pub async fn add_match(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
    Json(update): Json<MatchUpdate>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut bracket = state
        .store
        .find_bracket(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bracket not found"))?;

    bracket.record_match(update.result);
    state.store.update_bracket_matches(&bracket).await?;
    Ok(message("Match updated successfully"))
}
