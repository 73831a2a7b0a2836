//! # Flylight
//!
//! Badminton tournament registration, shop and payment server.
//!
//! ## Usage
//!
//! ```bash
//! export JWT_SECRET=...
//! export DATABASE_URL=sqlite://flylight.db?mode=rwc
//!
//! # Run the server
//! flylight
//! ```

use flylight_api::{routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    print_banner();

    let config = AppConfig::from_env();
    config.validate()?;
    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    let state = AppState::from_config(config).await?;

    info!("Environment: {}", state.config.environment);
    info!("Uploads: {}", state.uploads.root().display());

    let app = routes::create_router(state);

    info!("🏸 Flylight starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🗄️  Bootstrap: POST http://{}/api/init-db", addr);
        info!("💳 Payments: POST http://{}/api/payments/initiate", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  🏸 Flylight 🏸
  ━━━━━━━━━━━━━━━━━━━━━━━
  Tournaments, shop and payments
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
