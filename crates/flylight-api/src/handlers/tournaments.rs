//! Tournaments, events and registrations.

use super::{message, present};
use crate::auth::AdminContext;
use crate::error::{ApiError, ApiResult, Json};
use crate::state::AppState;
use crate::uploads::{FormData, TOURNAMENT_POSTERS};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension,
};
use chrono::Utc;
use flylight_core::tournament::{DEFAULT_CAPACITY, DEFAULT_STATUS};
use flylight_core::{parse_date, parse_time, Registration, Tournament, TournamentEvent};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

/// Tournament as returned to clients, with the derived display status
#[derive(Debug, Serialize)]
pub struct TournamentView {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub display_status: String,
}

impl From<Tournament> for TournamentView {
    fn from(tournament: Tournament) -> Self {
        Self {
            display_status: tournament.display_status().to_string(),
            tournament,
        }
    }
}

async fn load(state: &AppState, id: &str) -> ApiResult<Tournament> {
    state
        .store
        .find_tournament(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tournament not found"))
}

// =============================================================================
// Public
// =============================================================================

pub async fn list_tournaments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TournamentView>>> {
    let tournaments = state.store.list_tournaments().await?;
    Ok(Json(tournaments.into_iter().map(TournamentView::from).collect()))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TournamentView>> {
    Ok(Json(load(&state, &id).await?.into()))
}

pub async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<TournamentEvent>>> {
    load(&state, &id).await?;
    Ok(Json(state.store.list_events(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub academy_name: Option<String>,
    #[serde(default)]
    pub selected_venue: Option<String>,
}

#[instrument(skip(state, request), fields(tournament_id = %id))]
pub async fn join_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<JoinRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let tournament = load(&state, &id).await?;
    if !tournament.accept_entries {
        return Err(ApiError::bad_request("Tournament is closed for new entries")
            .with_status_detail(tournament.display_status()));
    }

    let mut registration =
        Registration::pending(&tournament.id, request.name, request.email, request.phone)?;
    registration.academy_name = request.academy_name;
    registration.selected_venue = request.selected_venue;
    state.store.insert_registration(&registration).await?;

    info!("Registration {} joined tournament {}", registration.id, tournament.id);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Tournament joined successfully",
            "registration_id": registration.id,
        })),
    ))
}

// =============================================================================
// Admin
// =============================================================================

pub async fn admin_list_tournaments(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
) -> ApiResult<Json<Vec<TournamentView>>> {
    let tournaments = state.store.list_tournaments_by_creator(admin.user_id()).await?;
    Ok(Json(tournaments.into_iter().map(TournamentView::from).collect()))
}

#[instrument(skip_all, fields(admin = %admin.user.email))]
pub async fn create_tournament(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let mut form = FormData::from_multipart(multipart).await?;

    let mut tournament = Tournament {
        id: Uuid::new_v4().to_string(),
        name: form.require("name")?.to_string(),
        description: form.text("description").map(String::from),
        venue: form.require("venue")?.to_string(),
        poster_url: None,
        gmaps_link: form.text("gmaps_link").map(String::from),
        start_date: parse_date("start_date", form.require("start_date")?)?,
        start_time: parse_time("start_time", form.require("start_time")?)?,
        end_date: parse_date("end_date", form.require("end_date")?)?,
        end_time: parse_time("end_time", form.require("end_time")?)?,
        price: form.parse::<f64>("price")?.unwrap_or(0.0),
        status: form.text("status").unwrap_or(DEFAULT_STATUS).to_string(),
        capacity: form.parse::<i64>("capacity")?.unwrap_or(DEFAULT_CAPACITY),
        created_by: Some(admin.user_id().to_string()),
        accept_entries: true,
        bracket_data: None,
        status_override: None,
        created_at: Utc::now(),
    };
    if let Some(file) = form.take_file("poster") {
        tournament.poster_url = state.uploads.save(TOURNAMENT_POSTERS, &file).await?;
    }
    state.store.insert_tournament(&tournament).await?;

    info!("Tournament {} created", tournament.id);
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": tournament.id,
            "message": "Tournament created successfully",
        })),
    ))
}

#[instrument(skip_all, fields(tournament_id = %id))]
pub async fn update_tournament(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<serde_json::Value>> {
    let mut tournament = load(&state, &id).await?;
    let mut form = FormData::from_multipart(multipart).await?;

    if let Some(name) = form.text("name") {
        tournament.name = name.to_string();
    }
    if let Some(description) = form.text("description") {
        tournament.description = Some(description.to_string());
    }
    if let Some(venue) = form.text("venue") {
        tournament.venue = venue.to_string();
    }
    if let Some(link) = form.text("gmaps_link") {
        tournament.gmaps_link = Some(link.to_string());
    }
    if let Some(status) = form.text("status") {
        tournament.status = status.to_string();
    }
    if let Some(price) = form.parse::<f64>("price")? {
        tournament.price = price;
    }
    if let Some(capacity) = form.parse::<i64>("capacity")? {
        tournament.capacity = capacity;
    }
    if let Some(value) = form.text("start_date") {
        tournament.start_date = parse_date("start_date", value)?;
    }
    if let Some(value) = form.text("start_time") {
        tournament.start_time = parse_time("start_time", value)?;
    }
    if let Some(value) = form.text("end_date") {
        tournament.end_date = parse_date("end_date", value)?;
    }
    if let Some(value) = form.text("end_time") {
        tournament.end_time = parse_time("end_time", value)?;
    }
    if let Some(file) = form.take_file("poster") {
        if let Some(url) = state.uploads.save(TOURNAMENT_POSTERS, &file).await? {
            tournament.poster_url = Some(url);
        }
    }

    state.store.update_tournament(&tournament).await?;
    Ok(message("Tournament updated successfully"))
}

#[derive(Debug, Deserialize)]
pub struct TournamentSettings {
    #[serde(default)]
    pub accept_entries: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub bracket_data: Option<Option<serde_json::Value>>,
    #[serde(default, deserialize_with = "present")]
    pub status_override: Option<Option<String>>,
}

#[instrument(skip_all, fields(tournament_id = %id))]
pub async fn update_tournament_settings(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
    Json(settings): Json<TournamentSettings>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut tournament = load(&state, &id).await?;

    if let Some(accept) = settings.accept_entries {
        tournament.accept_entries = accept;
    }
    if let Some(bracket_data) = settings.bracket_data {
        tournament.bracket_data = bracket_data;
    }
    if let Some(status_override) = settings.status_override {
        tournament.status_override = status_override.filter(|s| !s.trim().is_empty());
    }

    state.store.update_tournament(&tournament).await?;
    info!(
        "Tournament {} settings updated (accept_entries={})",
        tournament.id, tournament.accept_entries
    );

    Ok(Json(serde_json::json!({
        "message": "Tournament updated",
        "tournament": TournamentView::from(tournament),
    })))
}

pub async fn delete_tournament(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.store.delete_tournament(&id).await? {
        return Err(ApiError::not_found("Tournament not found"));
    }
    info!("Tournament {} deleted", id);
    Ok(message("Tournament deleted successfully"))
}

pub async fn list_registrations(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Registration>>> {
    Ok(Json(state.store.list_registrations(&id).await?))
}

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub entry_fee: Option<f64>,
    #[serde(default)]
    pub max_participants: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
    Json(request): Json<EventRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let tournament = load(&state, &id).await?;
    let name = request
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("name is required"))?;

    let event = TournamentEvent {
        id: Uuid::new_v4().to_string(),
        tournament_id: tournament.id,
        name,
        category: request.category,
        entry_fee: request.entry_fee.unwrap_or(tournament.price),
        max_participants: request.max_participants.unwrap_or(tournament.capacity),
        description: request.description,
        created_at: Utc::now(),
    };
    state.store.insert_event(&event).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": event.id,
            "message": "Event created successfully",
        })),
    ))
}

pub async fn update_event(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
    Json(request): Json<EventRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut event = state
        .store
        .find_event(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    if let Some(name) = request.name.filter(|n| !n.trim().is_empty()) {
        event.name = name;
    }
    if request.category.is_some() {
        event.category = request.category;
    }
    if let Some(fee) = request.entry_fee {
        event.entry_fee = fee;
    }
    if let Some(max) = request.max_participants {
        event.max_participants = max;
    }
    if request.description.is_some() {
        event.description = request.description;
    }

    state.store.update_event(&event).await?;
    Ok(message("Event updated successfully"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Extension(_admin): Extension<AdminContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    if !state.store.delete_event(&id).await? {
        return Err(ApiError::not_found("Event not found"));
    }
    Ok(message("Event deleted successfully"))
}
