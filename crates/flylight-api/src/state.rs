//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the store, the payment engine, auth services and configuration.

use crate::auth::{PasswordService, TokenService};
use crate::uploads::UploadStore;
use flylight_core::{Currency, PaymentEngine, ProductCatalog, TransactionSigner};
use flylight_store::Store;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

const DEV_JWT_SECRET: &str = "flylight-dev-secret-change-me";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// SQLite connection string
    pub database_url: String,
    /// HS256 signing secret for access tokens
    pub jwt_secret: String,
    /// Access token lifetime
    pub jwt_ttl_hours: i64,
    /// Key for transaction hashes; falls back to the JWT secret
    pub payment_secret: String,
    /// Currency for payments that name none
    pub currency: Currency,
    /// Root directory for uploaded images
    pub upload_dir: PathBuf,
    /// Request body cap, multipart included
    pub max_upload_bytes: usize,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Demo admin created by `POST /api/init-db`
    pub admin_email: String,
    pub admin_password: String,
    /// Whether `/api/auth/register` may create admins
    pub allow_admin_signup: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: "sqlite://flylight.db?mode=rwc".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_hours: 24,
            payment_secret: DEV_JWT_SECRET.to_string(),
            currency: Currency::default(),
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
            environment: "development".to_string(),
            admin_email: "admin@flylight.com".to_string(),
            admin_password: "admin123".to_string(),
            allow_admin_signup: true,
        }
    }
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let jwt_secret = env_or("JWT_SECRET", defaults.jwt_secret);
        Self {
            host: env_or("HOST", defaults.host),
            port: env_parse("PORT", defaults.port),
            database_url: env_or("DATABASE_URL", defaults.database_url),
            payment_secret: env_or("PAYMENT_SECRET", jwt_secret.clone()),
            jwt_secret,
            jwt_ttl_hours: env_parse("JWT_TTL_HOURS", defaults.jwt_ttl_hours),
            currency: std::env::var("CURRENCY")
                .ok()
                .and_then(|code| Currency::parse(&code))
                .unwrap_or(defaults.currency),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            environment: env_or("ENVIRONMENT", defaults.environment),
            admin_email: env_or("ADMIN_EMAIL", defaults.admin_email),
            admin_password: env_or("ADMIN_PASSWORD", defaults.admin_password),
            allow_admin_signup: env_parse("ALLOW_ADMIN_SIGNUP", defaults.allow_admin_signup),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Refuse to run production with the built-in development secret
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.is_production() {
            return Ok(());
        }
        if self.jwt_secret == DEV_JWT_SECRET {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        if self.payment_secret == DEV_JWT_SECRET {
            anyhow::bail!("PAYMENT_SECRET must be set in production");
        }
        Ok(())
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub engine: PaymentEngine,
    pub tokens: TokenService,
    pub passwords: PasswordService,
    pub uploads: UploadStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connect the store, prepare upload folders and wire the engine
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let store = Store::connect(&config.database_url).await?;
        let uploads = UploadStore::new(&config.upload_dir);
        uploads.prepare().await?;

        let engine = PaymentEngine::new(
            Arc::new(store.clone()),
            TransactionSigner::new(&config.payment_secret),
        )
        .with_currency(config.currency);

        Ok(Self {
            store,
            engine,
            tokens: TokenService::new(&config.jwt_secret, config.jwt_ttl_hours),
            passwords: PasswordService::new(),
            uploads,
            config: Arc::new(config),
        })
    }
}

/// Load the seed product catalog from config file
pub fn load_product_catalog() -> anyhow::Result<ProductCatalog> {
    let config_paths = [
        "config/products.toml",
        "../config/products.toml",
        "../../config/products.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog: ProductCatalog = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} seed products from {}", catalog.products.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No product catalog found, skipping product seed");
    Ok(ProductCatalog::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(config.jwt_ttl_hours, 24);
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..Default::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_production_requires_secret() {
        let mut config = AppConfig {
            environment: "production".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.jwt_secret = "real".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("PAYMENT_SECRET"));

        config.payment_secret = "real".to_string();
        assert!(config.validate().is_ok());

        config.jwt_secret = DEV_JWT_SECRET.to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_seed_catalog_parses() {
        let catalog: ProductCatalog = toml::from_str(
            r#"
            [[products]]
            name = "Racket"
            price = 1500.0
            stock = 4
            "#,
        )
        .unwrap();
        assert_eq!(catalog.products.len(), 1);
        assert_eq!(catalog.products[0].stock, 4);
    }
}
