//! # flylight-api
//!
//! HTTP API layer for Flylight.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Public endpoints for tournaments, the shop and payments
//! - Admin endpoints behind bearer-token authentication
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/init-db` | Bootstrap schema, admin and seed products |
//! | POST | `/api/auth/register` | Create an account |
//! | POST | `/api/auth/login` | Exchange credentials for a token |
//! | GET | `/api/tournaments` | List tournaments |
//! | POST | `/api/tournaments/{id}/join` | Register for a tournament |
//! | GET | `/api/products` | List products |
//! | POST | `/api/orders` | Place an order |
//! | POST | `/api/payments/initiate` | Start a payment |
//! | POST | `/api/payments/verify` | Verify and settle a payment |
//! | POST | `/api/payments/{id}/proof` | Attach a receipt |
//! | * | `/api/admin/...` | Tournament, product and bracket management |

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod uploads;

pub use error::{ApiError, ApiResult, Json};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
