//! Review model: a guest review for a listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub review_id: Uuid,
    pub listing_id: Uuid,
    pub reviewer_name: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a review.
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub listing_id: Uuid,
    pub reviewer_name: String,
    pub rating: i32,
    pub comment: Option<String>,
}

/// Input for a full review update.
#[derive(Debug, Clone)]
pub struct UpdateReview {
    pub reviewer_name: String,
    pub rating: i32,
    pub comment: Option<String>,
}
