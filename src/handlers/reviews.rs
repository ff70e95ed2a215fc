//! Review CRUD handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::handlers::default_limit;
use crate::models::{CreateReview, Review, UpdateReview};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub listing_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub reviewer_name: String,
    #[validate(range(min = 0))]
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(length(min = 1, max = 255))]
    pub reviewer_name: String,
    #[validate(range(min = 0))]
    pub rating: i32,
    pub comment: Option<String>,
}

/// List query with an optional listing scope.
#[derive(Debug, Deserialize)]
pub struct ReviewListQuery {
    pub listing_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = state
        .db
        .list_reviews(query.listing_id, query.limit, query.offset)
        .await?;
    Ok(Json(reviews))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<Json<Review>, AppError> {
    let review = state
        .db
        .get_review(review_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Review not found")))?;
    Ok(Json(review))
}

pub async fn create_review(
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .db
        .get_listing(payload.listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Listing not found")))?;

    let review = state
        .db
        .create_review(&CreateReview {
            listing_id: payload.listing_id,
            reviewer_name: payload.reviewer_name,
            rating: payload.rating,
            comment: payload.comment,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn update_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let review = state
        .db
        .update_review(
            review_id,
            &UpdateReview {
                reviewer_name: payload.reviewer_name,
                rating: payload.rating,
                comment: payload.comment,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Review not found")))?;

    Ok(Json(review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state.db.delete_review(review_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("Review not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
