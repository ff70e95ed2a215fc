//! Listing CRUD handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::handlers::ListQuery;
use crate::models::{CreateListing, Listing, UpdateListing};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ListingRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[validate(length(min = 1, max = 255))]
    pub location: String,
}

pub async fn list_listings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let listings = state.db.list_listings(query.limit, query.offset).await?;
    Ok(Json(listings))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<Json<Listing>, AppError> {
    let listing = state
        .db
        .get_listing(listing_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Listing not found")))?;
    Ok(Json(listing))
}

pub async fn create_listing(
    State(state): State<AppState>,
    Json(payload): Json<ListingRequest>,
) -> Result<(StatusCode, Json<Listing>), AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = state
        .db
        .create_listing(&CreateListing {
            title: payload.title,
            description: payload.description,
            price: payload.price,
            location: payload.location,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn update_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
    Json(payload): Json<ListingRequest>,
) -> Result<Json<Listing>, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let listing = state
        .db
        .update_listing(
            listing_id,
            &UpdateListing {
                title: payload.title,
                description: payload.description,
                price: payload.price,
                location: payload.location,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Listing not found")))?;

    Ok(Json(listing))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state.db.delete_listing(listing_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("Listing not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
