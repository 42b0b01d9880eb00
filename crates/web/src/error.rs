//! Error types for the HTTP API.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use media_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Object store error.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Malformed or unacceptable request.
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, String, Option<String>) {
        match self {
            ApiError::Database(err) => match err {
                DatabaseError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string(), None),
                DatabaseError::AlreadyExists { .. } | DatabaseError::AlreadyRedeemed { .. } => {
                    (StatusCode::CONFLICT, err.to_string(), None)
                }
                DatabaseError::Ledger(ledger) => (
                    StatusCode::BAD_REQUEST,
                    "Not enough points".to_string(),
                    Some(ledger.to_string()),
                ),
                DatabaseError::Validation(validation) => (
                    StatusCode::BAD_REQUEST,
                    "Validation failed".to_string(),
                    Some(validation.to_string()),
                ),
                _ => internal("Database error", err),
            },
            ApiError::Store(err) => match err {
                StoreError::InvalidKey(_) => (StatusCode::BAD_REQUEST, err.to_string(), None),
                StoreError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string(), None),
                StoreError::Io(_) => internal("Storage error", err),
            },
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
        }
    }
}

fn internal(
    message: &str,
    err: &dyn std::fmt::Display,
) -> (StatusCode, String, Option<String>) {
    tracing::error!("{}: {}", message, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        message.to_string(),
        Some(err.to_string()),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = self.parts();
        (status, Json(ErrorBody { error, details })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Invalid upload: {}", err.body_text()))
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use narinyland_core::LedgerError;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::from(DatabaseError::NotFound {
            entity: "Coupon",
            id: "x".to_string(),
        });
        assert_eq!(not_found.parts().0, StatusCode::NOT_FOUND);

        let redeemed = ApiError::from(DatabaseError::AlreadyRedeemed { id: "x".to_string() });
        assert_eq!(redeemed.parts().0, StatusCode::CONFLICT);

        let broke = ApiError::from(DatabaseError::from(LedgerError::InsufficientPoints {
            required: 100,
            available: 40,
        }));
        let (status, _, details) = broke.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(details.is_some());

        let corrupt = ApiError::from(DatabaseError::Corrupt {
            entity: "Memory",
            detail: "unknown privacy: secret".to_string(),
        });
        assert_eq!(corrupt.parts().0, StatusCode::INTERNAL_SERVER_ERROR);

        let bad_key = ApiError::from(StoreError::InvalidKey("../x".to_string()));
        assert_eq!(bad_key.parts().0, StatusCode::BAD_REQUEST);
    }
}
