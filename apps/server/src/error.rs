//! API error type and HTTP status mapping.
//!
//! Every failure body is `{"error": "<message>"}`.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  400  validation, unknown product in cart, stock, tender,           │
//! │       duplicates, blocked deletes                                   │
//! │  401  missing or invalid token                                      │
//! │  403  valid token, insufficient role                                │
//! │  404  GET by id missed                                              │
//! │  500  persistence failures, including PartialCommit; the body is    │
//! │       generic, details go to the server log only                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use pos_db::checkout::CheckoutFailure;
use pos_db::DbError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation(_)
            | DbError::Referenced { .. } => ApiError::BadRequest(err.to_string()),
            // Includes PartialCommit: the applied-statement count is for
            // the operator log, not the terminal.
            other => {
                error!(error = %other, "Datastore failure");
                ApiError::Internal
            }
        }
    }
}

impl From<CheckoutFailure> for ApiError {
    fn from(err: CheckoutFailure) -> Self {
        match err {
            // Business rejections carry their message to the terminal.
            CheckoutFailure::Domain(domain) => ApiError::BadRequest(domain.to_string()),
            CheckoutFailure::Db(db) => db.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_commit_is_generic_500() {
        let api: ApiError = DbError::PartialCommit {
            statements_applied: 2,
            cause: "connection reset".to_string(),
        }
        .into();
        assert!(matches!(api, ApiError::Internal));
        // The body must not leak internals.
        assert_eq!(api.to_string(), "Internal server error");
    }

    #[test]
    fn test_checkout_domain_errors_are_400() {
        let api: ApiError = CheckoutFailure::Domain(pos_core::CheckoutError::ProductNotFound(7)).into();
        match api {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Product with ID 7 not found"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }
}
