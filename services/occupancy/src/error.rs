//! Error types for the occupancy ledger and its HTTP surface
//!
//! Anomalies (bad direction, unmatched exit, unknown building) are not errors;
//! they travel inside [`crate::models::ScanOutcome`]. Only infrastructure
//! failures show up here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;

/// SQLSTATE codes for lock waits that can succeed on retry:
/// lock_not_available, deadlock_detected, serialization_failure
const RETRYABLE_SQLSTATES: [&str; 3] = ["55P03", "40P01", "40001"];

/// Failure of a ledger operation
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A lock could not be acquired within the configured timeout
    #[error("Lock contention on {resource}, retry the scan")]
    Contention { resource: String },

    /// The backing store cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Any other database failure
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl LedgerError {
    /// Whether the caller may retry the whole scan. Only lock contention is
    /// transient; an unreachable store fails the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Contention { .. })
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => LedgerError::Contention {
                resource: "connection pool".to_string(),
            },
            sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                LedgerError::Unavailable(err.to_string())
            }
            other => {
                let err = DatabaseError::Query(other);
                match err.sqlstate() {
                    Some(code) if RETRYABLE_SQLSTATES.contains(&code.as_str()) => {
                        LedgerError::Contention {
                            resource: format!("postgres ({}): {}", code, err),
                        }
                    }
                    _ => LedgerError::Database(err),
                }
            }
        }
    }
}

/// Type alias for ledger results
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Custom error type for the HTTP surface
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Health probe failed
    #[error("Service unavailable")]
    Unavailable,

    /// Ledger failure
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, retryable) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, false),
            ApiError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service unavailable".to_string(),
                false,
            ),
            ApiError::Ledger(err) if err.is_retryable() => {
                (StatusCode::SERVICE_UNAVAILABLE, err.to_string(), true)
            }
            ApiError::Ledger(LedgerError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage unavailable".to_string(),
                false,
            ),
            ApiError::Ledger(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                false,
            ),
        };

        let body = Json(json!({
            "error": error_message,
            "retryable": retryable,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_contention() {
        let err = LedgerError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, LedgerError::Contention { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_closed_pool_is_unavailable() {
        let err = LedgerError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, LedgerError::Unavailable(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_unavailable_store_is_not_retryable_over_http() {
        let response = ApiError::from(LedgerError::Unavailable("pool closed".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["retryable"], false);

        let response = ApiError::from(LedgerError::Contention {
            resource: "building B1".to_string(),
        })
        .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["retryable"], true);
    }

    #[test]
    fn test_other_errors_are_fatal() {
        let err = LedgerError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, LedgerError::Database(DatabaseError::Query(_))));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_api_error_status_codes() {
        let response = ApiError::BadRequest("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::NotFound("B99".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::from(LedgerError::Contention {
            resource: "building B1".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response =
            ApiError::from(LedgerError::from(sqlx::Error::RowNotFound)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
