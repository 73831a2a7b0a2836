//! Registration and login.

use crate::error::{ApiError, ApiResult, Json};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode};
use flylight_core::{Role, User};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub access_token: String,
}

fn respond(state: &AppState, user: &User) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(AuthResponse {
        user_id: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        access_token: state.tokens.issue(user)?,
    }))
}

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<Credentials>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password required"));
    }

    let role = match request.role.as_deref() {
        Some(role) => Role::parse(role)?,
        None => Role::User,
    };
    if role == Role::Admin && !state.config.allow_admin_signup {
        warn!("Admin self-registration refused for {}", email);
        return Err(ApiError::forbidden("Admin registration is disabled"));
    }

    let user = User::new(email, state.passwords.hash(&request.password)?, role);
    state.store.insert_user(&user).await?;
    info!("Registered {} as {}", user.email, user.role);

    Ok((StatusCode::CREATED, respond(&state, &user)?))
}

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<Credentials>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .store
        .find_user_by_email(request.email.trim())
        .await?
        .filter(|user| state.passwords.verify(&request.password, &user.password_hash))
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    respond(&state, &user)
}
