//! # Authentication
//!
//! Argon2 password hashing, HS256 access tokens and the admin gate.
//!
//! Admin routes sit behind [`require_admin`], which validates the bearer
//! token, loads the user and inserts an [`AdminContext`] into the request.
//! Handlers take the context as an extractor, so an admin-only handler
//! cannot be reached without it.

use crate::error::ApiError;
use crate::state::AppState;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use flylight_core::{FlylightError, FlylightResult, Role, User};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256 access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user: &User) -> FlylightResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| FlylightError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Check signature and expiry
    pub fn validate(&self, token: &str) -> FlylightResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected access token: {}", e);
                FlylightError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

/// Argon2id password hashing
#[derive(Clone, Default)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, password: &str) -> FlylightResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| FlylightError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// False for a wrong password or an unparseable stored hash
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .and_then(|parsed| self.argon2.verify_password(password.as_bytes(), &parsed))
            .is_ok()
    }
}

/// Proof that the request was made by an admin. Inserted by [`require_admin`].
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub user: User,
}

impl AdminContext {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

fn bearer_token(request: &Request) -> Result<&str, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Expected: Bearer <token>"))
}

/// Middleware: 401 without a valid token, 403 unless the user is an admin
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = state.tokens.validate(bearer_token(&request)?)?;

    // Role is re-read from the store; the claim may be stale.
    let user = state
        .store
        .find_user(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::forbidden("Admin access required"))?;

    if !user.is_admin() {
        warn!("Non-admin {} denied access to {}", user.email, request.uri().path());
        return Err(ApiError::forbidden("Admin access required"));
    }

    request.extensions_mut().insert(AdminContext { user });
    Ok(next.run(request).await)
}
