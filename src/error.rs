use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Database error: {0}")]
    Database(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Unique constraint violated: {}", err))
            }
            _ => AppError::Database(anyhow::Error::new(err)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        // Gateway failures surface as 400 to the caller: the request itself
        // could not be completed against the upstream provider.
        let (status, error_message, details) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string(), None),
            AppError::Gateway(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Conflict(err) => (StatusCode::CONFLICT, err.to_string(), None),
            AppError::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                Some(err.to_string()),
            ),
            AppError::Internal(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                None,
            ),
            AppError::Config(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let resp = AppError::Validation("booking_id and customer_email are required".into())
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = AppError::NotFound(anyhow::anyhow!("Booking not found")).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn gateway_maps_to_400() {
        let resp = AppError::Gateway("Chapa returned 502".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_maps_to_500() {
        let resp = AppError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn conflict_maps_to_409() {
        let resp = AppError::Conflict(anyhow::anyhow!("duplicate transaction_id")).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
