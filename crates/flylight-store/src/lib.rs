//! # flylight-store
//!
//! SQLite persistence for Flylight, built on `sqlx`.
//!
//! [`Store`] wraps a connection pool. Each entity module adds an `impl Store`
//! block with its queries; [`payments`] also implements
//! [`flylight_core::PaymentLedger`] so the payment engine can complete and
//! settle a payment inside a single transaction.
//!
//! ```rust,ignore
//! let store = Store::connect("sqlite://flylight.db?mode=rwc").await?;
//! let engine = PaymentEngine::new(Arc::new(store.clone()), signer);
//! ```

pub mod brackets;
pub mod error;
pub mod orders;
pub mod payments;
pub mod products;
mod schema;
pub mod stats;
pub mod tournaments;
pub mod users;

pub use error::{StoreError, StoreResult};
pub use stats::AdminStats;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

/// Handle to the relational store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database at `url` and apply the schema
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is a separate database, so pin the
        // pool to one connection that never expires.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(8)
                .connect_with(options)
                .await?
        };

        let store = Self { pool };
        store.migrate().await?;
        info!("Connected to store at {}", url);
        Ok(store)
    }

    /// Fresh private in-memory database
    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create any missing tables. Safe to run repeatedly.
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in schema::SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Schema applied ({} statements)", schema::SCHEMA.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = Store::in_memory().await.unwrap();
        store.migrate().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(store.pool())
        .await
        .unwrap();

        for table in ["orders", "payments", "products", "tournaments", "users"] {
            assert!(tables.iter().any(|t| t == table), "missing {}", table);
        }
    }
}
