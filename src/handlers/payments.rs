//! Payment handlers: the initiate/verify contract plus read-only
//! payment resources.
//!
//! Payment status is only ever written by the orchestrator, so there is no
//! generic create or update endpoint for payments.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::ListQuery;
use crate::models::Payment;
use crate::services::payments::InitiatePayment;
use crate::AppState;

/// Body of `POST /payments/initiate/`. Required fields stay optional at the
/// type level so their absence surfaces as a 400, not a deserialize reject.
#[derive(Debug, Deserialize)]
pub struct InitiatePaymentRequest {
    pub booking_id: Option<Uuid>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
}

/// Body of `POST /payments/verify/`.
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub transaction_id: Option<String>,
}

/// Payment representation returned by the API.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub checkout_url: Option<String>,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: p.payment_id,
            booking_id: p.booking_id,
            amount: p.amount,
            currency: p.currency,
            status: p.status,
            transaction_id: p.transaction_id,
            checkout_url: p.checkout_url,
            customer_email: p.customer_email,
            customer_phone: p.customer_phone,
            description: p.description,
            created_at: p.created_utc,
            updated_at: p.updated_utc,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InitiatePaymentResponse {
    pub message: String,
    pub payment: PaymentResponse,
    pub checkout_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub message: String,
    pub payment: PaymentResponse,
    pub chapa_status: String,
}

/// `POST /payments/initiate/`
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(payload): Json<InitiatePaymentRequest>,
) -> Result<(StatusCode, Json<InitiatePaymentResponse>), AppError> {
    tracing::info!(
        booking_id = ?payload.booking_id,
        customer_email = ?payload.customer_email,
        "Initiating payment"
    );

    let payment = state
        .payments
        .initiate(InitiatePayment {
            booking_id: payload.booking_id,
            customer_email: payload.customer_email,
            customer_phone: payload.customer_phone,
            description: payload.description,
        })
        .await?;

    let checkout_url = payment.checkout_url.clone();

    Ok((
        StatusCode::CREATED,
        Json(InitiatePaymentResponse {
            message: "Payment initiated successfully".to_string(),
            payment: PaymentResponse::from(payment),
            checkout_url,
        }),
    ))
}

/// `POST /payments/verify/`
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    tracing::info!(
        transaction_id = ?payload.transaction_id,
        "Verifying payment"
    );

    let verified = state.payments.verify(payload.transaction_id).await?;

    Ok(Json(VerifyPaymentResponse {
        message: "Payment verified successfully".to_string(),
        payment: PaymentResponse::from(verified.payment),
        chapa_status: verified.chapa_status,
    }))
}

/// `GET /payments/success/` — gateway return URL after a completed checkout.
pub async fn payment_success() -> Json<serde_json::Value> {
    Json(json!({ "message": "Payment completed successfully" }))
}

/// `GET /payments/cancel/` — gateway return URL after an abandoned checkout.
pub async fn payment_cancel() -> Json<serde_json::Value> {
    Json(json!({ "message": "Payment was cancelled" }))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = state.db.list_payments(query.limit, query.offset).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, AppError> {
    let payment = state
        .db
        .get_payment(payment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Payment not found")))?;
    Ok(Json(PaymentResponse::from(payment)))
}
