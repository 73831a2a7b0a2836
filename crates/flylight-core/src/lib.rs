//! # flylight-core
//!
//! Domain types and the payment engine for the Flylight badminton
//! tournament and storefront backend.
//!
//! This crate provides:
//! - `Tournament`, `TournamentEvent`, `Registration` and `Bracket`
//! - `Product`, `Order` and the seed `ProductCatalog`
//! - `Payment`, `TransactionSigner` and the `PaymentEngine`
//! - `PaymentLedger` trait for the persistence the engine needs
//! - `FlylightError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use flylight_core::{InitiatePayment, PaymentEngine, TransactionSigner, VerifyPayment};
//!
//! let engine = PaymentEngine::new(ledger, TransactionSigner::new(secret));
//!
//! // Record a pending payment for a tournament entry
//! let payment = engine.initiate(request).await?;
//!
//! // The payer reports back with the identifiers they were given
//! let verified = engine.verify(VerifyPayment {
//!     payment_id: payment.id.clone(),
//!     transaction_id: Some(payment.transaction_id.clone()),
//!     verification_token: Some(payment.verification_token.clone()),
//!     payment_reference: None,
//! }).await?;
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod money;
pub mod payment;
pub mod tournament;
pub mod user;

// Re-exports for convenience
pub use catalog::{NewOrder, Order, OrderItem, OrderStatus, Product, ProductCatalog, SeedProduct};
pub use engine::{
    BoxedPaymentLedger, PaymentEngine, PaymentLedger, Verified, DUPLICATE_WINDOW_MINUTES,
};
pub use error::{FlylightError, FlylightResult};
pub use money::{Currency, Price};
pub use payment::{
    InitiatePayment, Payment, PaymentStatus, ReferenceType, Settlement, TransactionSigner,
    VerifyPayment,
};
pub use tournament::{
    parse_date, parse_time, Bracket, Registration, RegistrationStatus, Tournament,
    TournamentEvent,
};
pub use user::{Role, User};
