//! Listing model: a property available for booking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listing {
    pub listing_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub location: String,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a listing.
#[derive(Debug, Clone)]
pub struct CreateListing {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub location: String,
}

/// Input for a full listing update.
#[derive(Debug, Clone)]
pub struct UpdateListing {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub location: String,
}
