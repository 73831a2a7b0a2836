//! Store errors and their mapping onto [`FlylightError`].

use flylight_core::FlylightError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A UNIQUE constraint rejected the write
    #[error("{0}")]
    Duplicate(String),

    /// A stored value no longer parses into its domain type
    #[error("Corrupt row in {table}: {detail}")]
    Corrupt { table: &'static str, detail: String },
}

impl StoreError {
    pub(crate) fn corrupt(table: &'static str, detail: impl Into<String>) -> Self {
        StoreError::Corrupt {
            table,
            detail: detail.into(),
        }
    }

    /// Map a unique-constraint violation onto [`StoreError::Duplicate`]
    pub(crate) fn on_unique(message: &str) -> impl FnOnce(sqlx::Error) -> StoreError + '_ {
        move |err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(message.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

impl From<StoreError> for FlylightError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(message) => FlylightError::Conflict(message),
            other => FlylightError::Storage(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
