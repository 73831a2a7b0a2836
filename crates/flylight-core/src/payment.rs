//! # Payment Types
//!
//! Payments, their status machine, and the identifiers minted at initiation.
//!
//! ```text
//!   initiate ──► pending ──verify──► completed ──► settlement
//!                   │                               ├── tournament: confirm registration
//!                   └──► failed (reserved)          └── order: confirm, decrement stock
//! ```

use crate::error::{FlylightError, FlylightResult};
use crate::money::{Currency, Price};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Payment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// What a payment pays for; tags the polymorphic `reference_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Tournament,
    Order,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Tournament => "tournament",
            ReferenceType::Order => "order",
        }
    }

    pub fn parse(value: &str) -> FlylightResult<Self> {
        match value {
            "tournament" => Ok(ReferenceType::Tournament),
            "order" => Ok(ReferenceType::Order),
            other => Err(FlylightError::validation(format!(
                "reference_type must be 'tournament' or 'order', got '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded payment intent and its verification state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    /// Globally unique, shown to the payer
    pub transaction_id: String,
    pub amount: Price,
    pub payment_method: Option<String>,
    pub user_email: String,
    pub reference_id: String,
    pub reference_type: ReferenceType,
    pub status: PaymentStatus,
    /// Receipt or UPI reference reported by the payer at verification
    pub payment_reference: Option<String>,
    pub payment_proof_url: Option<String>,
    #[serde(skip_serializing)]
    pub verification_token: String,
    #[serde(skip_serializing)]
    pub transaction_hash: String,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    /// Move to `completed`. Only pending payments may complete.
    pub fn complete(
        &mut self,
        at: DateTime<Utc>,
        payment_reference: Option<String>,
    ) -> FlylightResult<()> {
        if !self.is_pending() {
            return Err(FlylightError::Conflict(format!(
                "Payment already {}",
                self.status.as_str()
            )));
        }
        self.status = PaymentStatus::Completed;
        self.verified_at = Some(at);
        if payment_reference.is_some() {
            self.payment_reference = payment_reference;
        }
        Ok(())
    }
}

/// Input to [`crate::PaymentEngine::initiate`]
#[derive(Debug, Clone, Deserialize)]
pub struct InitiatePayment {
    pub amount: f64,
    pub email: String,
    pub reference_id: String,
    pub reference_type: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Input to [`crate::PaymentEngine::verify`].
///
/// `transaction_id` and `verification_token` are checked whenever supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPayment {
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub verification_token: Option<String>,
    #[serde(default)]
    pub payment_reference: Option<String>,
}

/// Side effects applied to the referenced entity once a payment completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Settlement {
    RegistrationConfirmed { registration_id: String },
    OrderConfirmed { order_id: String, lines_adjusted: usize },
    /// The reference pointed at nothing settleable; the payment still completes
    Unmatched,
}

/// Mints transaction identifiers and keyed anti-replay hashes
#[derive(Clone)]
pub struct TransactionSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TransactionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSigner").finish_non_exhaustive()
    }
}

impl TransactionSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// `TXN-<YYYYmmddHHMMSS>-<8 hex>`
    pub fn transaction_id(&self, at: DateTime<Utc>) -> String {
        format!(
            "TXN-{}-{}",
            at.format("%Y%m%d%H%M%S"),
            hex::encode(rand::random::<[u8; 4]>())
        )
    }

    /// 32 random bytes, hex encoded
    pub fn verification_token(&self) -> String {
        hex::encode(rand::random::<[u8; 32]>())
    }

    /// Keyed digest over transaction id, amount, payer and initiation time
    pub fn transaction_hash(
        &self,
        transaction_id: &str,
        amount: &Price,
        email: &str,
        at: DateTime<Utc>,
    ) -> FlylightResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| FlylightError::Internal(format!("HMAC key rejected: {}", e)))?;
        mac.update(transaction_id.as_bytes());
        mac.update(format!("{:.2}", amount.as_decimal()).as_bytes());
        mac.update(email.as_bytes());
        mac.update(at.to_rfc3339().as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Build a fresh pending payment
    pub fn mint(
        &self,
        amount: Price,
        user_email: String,
        reference_id: String,
        reference_type: ReferenceType,
        payment_method: Option<String>,
    ) -> FlylightResult<Payment> {
        let now = Utc::now();
        let transaction_id = self.transaction_id(now);
        let transaction_hash = self.transaction_hash(&transaction_id, &amount, &user_email, now)?;

        Ok(Payment {
            id: Uuid::new_v4().to_string(),
            transaction_id,
            amount,
            payment_method,
            user_email,
            reference_id,
            reference_type,
            status: PaymentStatus::Pending,
            payment_reference: None,
            payment_proof_url: None,
            verification_token: self.verification_token(),
            transaction_hash,
            created_at: now,
            verified_at: None,
        })
    }
}

impl InitiatePayment {
    /// Validate the request and resolve amount and reference tag
    pub fn validate(&self, default_currency: Currency) -> FlylightResult<(Price, ReferenceType)> {
        let currency = match self.currency.as_deref() {
            Some(code) => Currency::parse(code)
                .ok_or_else(|| {
                    FlylightError::validation(format!("Unsupported currency: {}", code))
                })?,
            None => default_currency,
        };

        if !self.amount.is_finite() {
            return Err(FlylightError::validation("Amount must be a number"));
        }
        let amount = Price::new(self.amount, currency);
        if !amount.is_positive() {
            return Err(FlylightError::validation("Amount must be greater than zero"));
        }
        if self.email.trim().is_empty() {
            return Err(FlylightError::validation("Email is required"));
        }
        if self.reference_id.trim().is_empty() {
            return Err(FlylightError::validation("reference_id is required"));
        }

        Ok((amount, ReferenceType::parse(&self.reference_type)?))
    }
}
