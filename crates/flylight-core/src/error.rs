//! # Error Types
//!
//! Typed error handling for Flylight.
//! Every domain and payment operation returns `Result<T, FlylightError>`;
//! the HTTP layer turns the variant into a status code via [`FlylightError::status_code`].

use thiserror::Error;

/// Core error type shared by the store, the payment engine and the API
#[derive(Debug, Error)]
pub enum FlylightError {
    /// Missing or malformed request data
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed or rejected credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role
    #[error("{0}")]
    Forbidden(String),

    /// Entity lookup failed
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// Uniqueness or state conflict
    #[error("{0}")]
    Conflict(String),

    /// Submitted transaction id does not match the stored payment
    #[error("Transaction ID mismatch")]
    TransactionMismatch,

    /// Submitted verification token does not match the stored payment
    #[error("Invalid verification token")]
    InvalidVerificationToken,

    /// A completed payment for the same payer, amount and reference exists
    /// inside the duplicate window
    #[error("Duplicate payment detected")]
    DuplicatePayment,

    /// Relational store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Anything else that should not happen
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlylightError {
    /// Shorthand for [`FlylightError::NotFound`]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        FlylightError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for [`FlylightError::Validation`]
    pub fn validation(message: impl Into<String>) -> Self {
        FlylightError::Validation(message.into())
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            FlylightError::Validation(_) => 400,
            FlylightError::Unauthorized(_) => 401,
            FlylightError::Forbidden(_) => 403,
            FlylightError::NotFound { .. } => 404,
            FlylightError::Conflict(_) => 409,
            FlylightError::TransactionMismatch => 400,
            FlylightError::InvalidVerificationToken => 400,
            FlylightError::DuplicatePayment => 400,
            FlylightError::Storage(_) => 500,
            FlylightError::Internal(_) => 500,
        }
    }

    /// Server-side failures are logged and masked before reaching the client
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

/// Result type alias for Flylight operations
pub type FlylightResult<T> = Result<T, FlylightError>;
