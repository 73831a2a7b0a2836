//! Dashboard counters and database bootstrap.

use crate::auth::AdminContext;
use crate::error::{ApiError, ApiResult, Json};
use crate::state::{load_product_catalog, AppState};
use axum::{extract::State, http::StatusCode, Extension};
use flylight_core::{Role, User};
use flylight_store::AdminStats;
use tracing::{info, instrument};

pub async fn stats(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminContext>,
) -> ApiResult<Json<AdminStats>> {
    Ok(Json(state.store.admin_stats(admin.user_id()).await?))
}

/// Create the tables, the configured admin and the seed products.
///
/// Idempotent: a second call finds the admin and changes nothing.
#[instrument(skip_all)]
pub async fn init_db(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    state.store.migrate().await?;

    let email = state.config.admin_email.as_str();
    if state.store.find_user_by_email(email).await?.is_some() {
        return Ok((StatusCode::OK, super::message("Database already initialized")));
    }

    let admin = User::new(
        email,
        state.passwords.hash(&state.config.admin_password)?,
        Role::Admin,
    );
    state.store.insert_user(&admin).await?;
    info!("Created admin {}", admin.email);

    if state.store.count_products().await? == 0 {
        let catalog = load_product_catalog()
            .map_err(|e| ApiError::internal(format!("Product catalog: {}", e)))?;
        let seeded = catalog.products.len();
        for seed in catalog.products {
            let product = seed.into_product(&admin.id)?;
            state.store.insert_product(&product).await?;
        }
        info!("Seeded {} products", seeded);
    }

    Ok((
        StatusCode::CREATED,
        super::message("Database initialized successfully"),
    ))
}
