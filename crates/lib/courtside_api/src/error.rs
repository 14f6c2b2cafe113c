//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use courtside_core::catalog::CatalogError;
use courtside_core::codes::{CodeError, RedeemError};
use courtside_core::devices::TrackError;
use courtside_core::entitlement::EntitlementError;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Banned or over the device limit; the caller routes to the blocked
    /// state and signs the session out.
    #[error("Blocked: {0}")]
    Blocked(String),

    #[error("Code exhausted: {0}")]
    Exhausted(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::Blocked(m) => (StatusCode::FORBIDDEN, "blocked", m.as_str()),
            AppError::Exhausted(m) => (StatusCode::CONFLICT, "code_exhausted", m.as_str()),
            // Store detail is logged, never surfaced.
            AppError::StoreUnavailable(m) => {
                error!(detail = %m, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    "Service temporarily unavailable",
                )
            }
            AppError::Internal(m) => {
                error!(detail = %m, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::StoreUnavailable(e.to_string())
    }
}

impl From<EntitlementError> for AppError {
    fn from(e: EntitlementError) -> Self {
        match e {
            EntitlementError::NotFound => AppError::NotFound("content not found".into()),
            EntitlementError::Store(e) => AppError::StoreUnavailable(e.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound => AppError::NotFound("content not found".into()),
            CatalogError::Db(e) => AppError::StoreUnavailable(e.to_string()),
        }
    }
}

impl From<TrackError> for AppError {
    fn from(e: TrackError) -> Self {
        match e {
            TrackError::Banned => AppError::Blocked("Account is blocked".into()),
            TrackError::TooManyDevices => {
                AppError::Blocked("Account exceeds the device limit".into())
            }
            TrackError::Db(e) => AppError::StoreUnavailable(e.to_string()),
        }
    }
}

impl From<RedeemError> for AppError {
    fn from(e: RedeemError) -> Self {
        match e {
            RedeemError::NotFound => AppError::NotFound("code not found".into()),
            RedeemError::Exhausted => {
                AppError::Exhausted("Code has no redemptions left".into())
            }
            RedeemError::InconsistentScope(m) => AppError::Internal(m),
            RedeemError::Db(e) => AppError::StoreUnavailable(e.to_string()),
        }
    }
}

impl From<CodeError> for AppError {
    fn from(e: CodeError) -> Self {
        match e {
            CodeError::Validation(m) => AppError::Validation(m),
            CodeError::Collision(n) => {
                AppError::Internal(format!("code collision after {n} attempts"))
            }
            CodeError::Db(e) => AppError::StoreUnavailable(e.to_string()),
        }
    }
}
