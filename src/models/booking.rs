//! Booking model: a customer's booking of a listing.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub booking_id: Uuid,
    pub listing_id: Uuid,
    pub guest_name: String,
    /// Recipient of the booking confirmation email. Optional; when absent
    /// the confirmation is skipped.
    pub guest_email: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
}

/// Booking joined with the listing fields the payment flow needs.
#[derive(Debug, Clone, FromRow)]
pub struct BookingWithListing {
    pub booking_id: Uuid,
    pub listing_id: Uuid,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub listing_title: String,
    pub listing_price: Decimal,
}

/// Input for creating a booking.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub listing_id: Uuid,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Input for a full booking update.
#[derive(Debug, Clone)]
pub struct UpdateBooking {
    pub listing_id: Uuid,
    pub guest_name: String,
    pub guest_email: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}
