//! Payment initiation, verification and receipts.

use crate::error::{ApiError, ApiResult, Json};
use crate::state::AppState;
use crate::uploads::{FormData, PAYMENT_RECEIPTS};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use flylight_core::{
    Currency, InitiatePayment, Payment, PaymentStatus, ReferenceType, Settlement, VerifyPayment,
};
use serde::Serialize;
use tracing::{info, instrument};

/// Payment as returned to clients. Amounts are decimal; secrets are omitted.
#[derive(Debug, Serialize)]
pub struct PaymentView {
    pub id: String,
    pub transaction_id: String,
    pub amount: f64,
    pub currency: Currency,
    pub payment_method: Option<String>,
    pub status: PaymentStatus,
    pub user_email: String,
    pub reference_id: String,
    pub reference_type: ReferenceType,
    pub payment_reference: Option<String>,
    pub payment_proof_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl From<Payment> for PaymentView {
    fn from(p: Payment) -> Self {
        Self {
            amount: p.amount.as_decimal(),
            currency: p.amount.currency,
            id: p.id,
            transaction_id: p.transaction_id,
            payment_method: p.payment_method,
            status: p.status,
            user_email: p.user_email,
            reference_id: p.reference_id,
            reference_type: p.reference_type,
            payment_reference: p.payment_reference,
            payment_proof_url: p.payment_proof_url,
            created_at: p.created_at,
            verified_at: p.verified_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InitiateResponse {
    pub payment_id: String,
    pub transaction_id: String,
    pub amount: f64,
    pub currency: Currency,
    pub verification_token: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub message: &'static str,
    pub status: PaymentStatus,
    pub payment: PaymentView,
    pub settlement: Settlement,
}

#[instrument(skip_all, fields(reference_id = %request.reference_id))]
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(request): Json<InitiatePayment>,
) -> ApiResult<(StatusCode, Json<InitiateResponse>)> {
    let payment = state.engine.initiate(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(InitiateResponse {
            payment_id: payment.id,
            transaction_id: payment.transaction_id,
            amount: payment.amount.as_decimal(),
            currency: payment.amount.currency,
            verification_token: payment.verification_token,
            message: "Payment initiated",
        }),
    ))
}

async fn verify(state: &AppState, request: VerifyPayment) -> ApiResult<Json<VerifyResponse>> {
    let verified = state.engine.verify(request).await?;
    Ok(Json(VerifyResponse {
        message: "Payment verified successfully",
        status: verified.payment.status,
        payment: verified.payment.into(),
        settlement: verified.settlement,
    }))
}

/// Strict verification: payment id, transaction id and token are all required
#[instrument(skip_all, fields(payment_id = %request.payment_id))]
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyPayment>,
) -> ApiResult<Json<VerifyResponse>> {
    let missing = |v: &Option<String>| v.as_deref().map_or(true, |s| s.is_empty());
    if request.payment_id.is_empty() {
        return Err(ApiError::bad_request("payment_id is required"));
    }
    if missing(&request.transaction_id) || missing(&request.verification_token) {
        return Err(ApiError::bad_request("transaction_id and verification_token are required"));
    }

    verify(&state, request).await
}

/// Verification addressed by path; identifiers in the body are checked when present
#[instrument(skip_all, fields(payment_id = %id))]
pub async fn verify_payment_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<VerifyPayment>>,
) -> ApiResult<Json<VerifyResponse>> {
    let mut request = body.map(|Json(r)| r).unwrap_or_default();
    request.payment_id = id;
    verify(&state, request).await
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PaymentView>> {
    Ok(Json(state.engine.payment(&id).await?.into()))
}

/// Attach a receipt image (multipart field `receipt`)
#[instrument(skip_all, fields(payment_id = %id))]
pub async fn upload_proof(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<PaymentView>> {
    // 404 before anything is written to disk
    state.engine.payment(&id).await?;

    let mut form = FormData::from_multipart(multipart).await?;
    let file = form
        .take_file("receipt")
        .ok_or_else(|| ApiError::bad_request("receipt file is required"))?;
    let url = state
        .uploads
        .save(PAYMENT_RECEIPTS, &file)
        .await?
        .ok_or_else(|| ApiError::bad_request("Receipt must be a png, jpg, jpeg or gif image"))?;

    state.store.set_payment_proof(&id, &url).await?;
    info!("Receipt stored for payment {}", id);

    Ok(Json(state.engine.payment(&id).await?.into()))
}
