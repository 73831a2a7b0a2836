//! # Payment Engine
//!
//! Initiation, verification and settlement of payments.
//!
//! The engine owns the rules (identifier minting, mismatch checks, the
//! duplicate-submission window) and delegates persistence to a
//! [`PaymentLedger`]. The ledger applies the completed payment together
//! with its settlement atomically.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                PaymentEngine                 │
//! │  ├── initiate()   mint ids, record pending   │
//! │  ├── verify()     checks, complete, settle   │
//! │  └── payment()    lookup                     │
//! └──────────────────────┬───────────────────────┘
//!                        │ Arc<dyn PaymentLedger>
//!                ┌───────┴────────┐
//!                │  SQLite store  │
//!                └────────────────┘
//! ```
//!
//! Two concurrent `verify` calls for the same payment can both pass the
//! duplicate check before either commits. Nothing here serializes them.

use crate::error::{FlylightError, FlylightResult};
use crate::money::Currency;
use crate::payment::{InitiatePayment, Payment, Settlement, TransactionSigner, VerifyPayment};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Trailing window in which a second completed payment for the same
/// payer, amount and reference is treated as a duplicate submission.
pub const DUPLICATE_WINDOW_MINUTES: i64 = 5;

/// Persistence required by the payment engine
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Record a freshly minted payment
    async fn insert_payment(&self, payment: &Payment) -> FlylightResult<()>;

    /// Find a payment by id
    async fn find_payment(&self, payment_id: &str) -> FlylightResult<Option<Payment>>;

    /// Is there a completed payment for this payer, amount (minor units) and
    /// reference verified strictly after `since`?
    async fn has_recent_completion(
        &self,
        user_email: &str,
        amount_minor: i64,
        reference_id: &str,
        since: DateTime<Utc>,
    ) -> FlylightResult<bool>;

    /// Persist the completed payment and apply its settlement in one
    /// transaction. Nothing is written if any step fails.
    async fn complete_and_settle(&self, payment: &Payment) -> FlylightResult<Settlement>;
}

/// Type alias for a shared ledger (dynamic dispatch)
pub type BoxedPaymentLedger = Arc<dyn PaymentLedger>;

/// Outcome of a successful verification
#[derive(Debug, Clone)]
pub struct Verified {
    pub payment: Payment,
    pub settlement: Settlement,
}

#[derive(Clone)]
pub struct PaymentEngine {
    ledger: BoxedPaymentLedger,
    signer: TransactionSigner,
    currency: Currency,
    duplicate_window: Duration,
}

impl PaymentEngine {
    pub fn new(ledger: BoxedPaymentLedger, signer: TransactionSigner) -> Self {
        Self {
            ledger,
            signer,
            currency: Currency::default(),
            duplicate_window: Duration::minutes(DUPLICATE_WINDOW_MINUTES),
        }
    }

    /// Builder: set the currency used when a request names none
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Builder: override the duplicate window
    pub fn with_duplicate_window(mut self, window: Duration) -> Self {
        self.duplicate_window = window;
        self
    }

    /// Record a pending payment. No gateway is contacted.
    #[instrument(skip(self, request), fields(reference_id = %request.reference_id))]
    pub async fn initiate(&self, request: InitiatePayment) -> FlylightResult<Payment> {
        let (amount, reference_type) = request.validate(self.currency)?;

        let payment = self.signer.mint(
            amount,
            request.email,
            request.reference_id,
            reference_type,
            request.payment_method,
        )?;
        self.ledger.insert_payment(&payment).await?;

        info!(
            "Initiated payment: id={}, txn={}, amount={}, reference={}:{}",
            payment.id,
            payment.transaction_id,
            payment.amount.display(),
            payment.reference_type,
            payment.reference_id
        );

        Ok(payment)
    }

    /// Verify a self-reported payment and settle it.
    ///
    /// Order of checks: existence, transaction id, verification token,
    /// duplicate window, then pending state.
    #[instrument(skip(self, request), fields(payment_id = %request.payment_id))]
    pub async fn verify(&self, request: VerifyPayment) -> FlylightResult<Verified> {
        let mut payment = self
            .ledger
            .find_payment(&request.payment_id)
            .await?
            .ok_or_else(|| FlylightError::not_found("Payment", request.payment_id.clone()))?;

        if let Some(transaction_id) = request.transaction_id.as_deref() {
            if transaction_id != payment.transaction_id {
                warn!("Transaction id mismatch for payment {}", payment.id);
                return Err(FlylightError::TransactionMismatch);
            }
        }

        if let Some(token) = request.verification_token.as_deref() {
            if !constant_time_eq(token, &payment.verification_token) {
                warn!("Verification token mismatch for payment {}", payment.id);
                return Err(FlylightError::InvalidVerificationToken);
            }
        }

        let now = Utc::now();
        let duplicate = self
            .ledger
            .has_recent_completion(
                &payment.user_email,
                payment.amount.amount,
                &payment.reference_id,
                now - self.duplicate_window,
            )
            .await?;
        if duplicate {
            warn!(
                "Duplicate payment for {} on {}:{}",
                payment.user_email, payment.reference_type, payment.reference_id
            );
            return Err(FlylightError::DuplicatePayment);
        }

        payment.complete(now, request.payment_reference)?;
        let settlement = self.ledger.complete_and_settle(&payment).await?;

        info!(
            "Verified payment: id={}, txn={}, settlement={:?}",
            payment.id, payment.transaction_id, settlement
        );

        Ok(Verified { payment, settlement })
    }

    pub async fn payment(&self, payment_id: &str) -> FlylightResult<Payment> {
        self.ledger
            .find_payment(payment_id)
            .await?
            .ok_or_else(|| FlylightError::not_found("Payment", payment_id))
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
