//! # Routes
//!
//! Axum router configuration for the Flylight API.

use crate::auth;
use crate::handlers::{self, admin, brackets, orders, payments, products, tournaments};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Public:
///   - POST /api/init-db, /api/auth/register, /api/auth/login
///   - GET  /api/tournaments, /api/tournaments/{id}, /api/tournaments/{id}/events
///   - POST /api/tournaments/{id}/join
///   - GET  /api/products; POST /api/orders; GET /api/orders/{id}
///   - POST /api/payments/initiate, /api/payments/verify, /api/payments/{id}/verify
///   - GET  /api/payments/{id}; POST /api/payments/{id}/proof
///
/// - Admin (bearer token of an admin user): everything under /api/admin
///
/// - Static: GET /uploads/...
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let tournament_routes = Router::new()
        .route("/", get(tournaments::list_tournaments))
        .route("/{id}", get(tournaments::get_tournament))
        .route("/{id}/events", get(tournaments::list_events))
        .route("/{id}/join", post(tournaments::join_tournament));

    let payment_routes = Router::new()
        .route("/initiate", post(payments::initiate_payment))
        .route("/verify", post(payments::verify_payment))
        .route("/{id}", get(payments::get_payment))
        .route("/{id}/verify", post(payments::verify_payment_by_id))
        .route("/{id}/proof", post(payments::upload_proof));

    let admin_routes = Router::new()
        .route(
            "/tournaments",
            get(tournaments::admin_list_tournaments).post(tournaments::create_tournament),
        )
        .route(
            "/tournaments/{id}",
            put(tournaments::update_tournament).delete(tournaments::delete_tournament),
        )
        .route("/tournaments/{id}/settings", put(tournaments::update_tournament_settings))
        .route("/tournaments/{id}/registrations", get(tournaments::list_registrations))
        .route("/tournaments/{id}/events", post(tournaments::create_event))
        .route(
            "/events/{id}",
            put(tournaments::update_event).delete(tournaments::delete_event),
        )
        .route(
            "/products",
            get(products::admin_list_products).post(products::create_product),
        )
        .route(
            "/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/brackets", post(brackets::create_bracket))
        .route("/brackets/{id}", get(brackets::get_bracket))
        .route("/brackets/{id}/match", put(brackets::add_match))
        .route("/stats", get(admin::stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin));

    let api_routes = Router::new()
        .route("/init-db", post(admin::init_db))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .nest("/tournaments", tournament_routes)
        .route("/products", get(products::list_products))
        .route("/orders", post(orders::create_order))
        .route("/orders/{id}", get(orders::get_order))
        .nest("/payments", payment_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(state.uploads.root()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .with_state(state)
}
