//! Booking CRUD handlers.
//!
//! Creating a booking enqueues a confirmation email task after the row is
//! persisted. The task runs in the background with no ordering guarantee
//! relative to the HTTP response, and its failure is invisible here.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::handlers::ListQuery;
use crate::models::{Booking, CreateBooking, UpdateBooking};
use crate::services::queue::{BookingConfirmation, TASK_BOOKING_CONFIRMATION};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct BookingRequest {
    pub listing_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub guest_name: String,
    #[validate(email)]
    pub guest_email: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.db.list_bookings(query.limit, query.offset).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .db
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Booking not found")))?;
    Ok(Json(booking))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if payload.end_date < payload.start_date {
        return Err(AppError::Validation(
            "end_date must not precede start_date".to_string(),
        ));
    }

    let listing = state
        .db
        .get_listing(payload.listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Listing not found")))?;

    let booking = state
        .db
        .create_booking(&CreateBooking {
            listing_id: payload.listing_id,
            guest_name: payload.guest_name,
            guest_email: payload.guest_email,
            start_date: payload.start_date,
            end_date: payload.end_date,
        })
        .await?;

    // Fire-and-forget confirmation. Bookings without an email skip it.
    if let Some(ref email) = booking.guest_email {
        let confirmation = BookingConfirmation {
            to: email.clone(),
            booking_id: booking.booking_id,
            details: format!(
                "Booking ID: {}, Listing: {}, {} to {}",
                booking.booking_id, listing.title, booking.start_date, booking.end_date
            ),
        };
        match serde_json::to_value(&confirmation) {
            Ok(payload) => state.queue.enqueue(TASK_BOOKING_CONFIRMATION, payload),
            Err(e) => tracing::error!(error = %e, "Failed to serialize confirmation payload"),
        }
    }

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn update_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<BookingRequest>,
) -> Result<Json<Booking>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if payload.end_date < payload.start_date {
        return Err(AppError::Validation(
            "end_date must not precede start_date".to_string(),
        ));
    }

    state
        .db
        .get_listing(payload.listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Listing not found")))?;

    let booking = state
        .db
        .update_booking(
            booking_id,
            &UpdateBooking {
                listing_id: payload.listing_id,
                guest_name: payload.guest_name,
                guest_email: payload.guest_email,
                start_date: payload.start_date,
                end_date: payload.end_date,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Booking not found")))?;

    Ok(Json(booking))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state.db.delete_booking(booking_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("Booking not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
