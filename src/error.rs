use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Uniform response body: every error (and most confirmations) are
/// `{"message": ...}` on the wire.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("username is already taken")]
    NonUnique,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("not enough stock")]
    InsufficientStock,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("insufficient privileges")]
    Forbidden,

    #[error("database operation timed out")]
    Timeout,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::NonUnique
            | ApiError::InvalidCredentials
            | ApiError::InsufficientStock => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Timeout | ApiError::Database(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            // Log the detail, keep the body generic.
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_bad_request() {
        assert_eq!(ApiError::NonUnique.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InsufficientStock.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation("quantity must be positive".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn auth_errors_are_distinct() {
        assert_eq!(
            ApiError::Unauthorized("missing Authorization header").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn infrastructure_errors_map_to_server_error() {
        assert_eq!(
            ApiError::Timeout.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::PoolClosed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = ApiError::NotFound("product");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "product not found");
    }

    #[test]
    fn message_body_shape() {
        let body = serde_json::to_value(MessageResponse::new("not enough stock")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "not enough stock" }));
    }
}
