//! Unified error handling for CMS Core

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use uuid::Uuid;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// When set, 5xx bodies include the underlying error text (development only).
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Toggle inclusion of internal error detail in 5xx responses.
pub fn set_expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

fn expose_internal_errors() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed)
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A business rule rejected the operation. The message is shown to end users.
    #[error("{0}")]
    BusinessRule(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Map a store error, turning unique-key violations into `Conflict`.
    pub fn from_write(err: sqlx::Error, conflict_message: impl Into<String>) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::Conflict(conflict_message.into());
            }
        }
        AppError::Database(err)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::BusinessRule(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorResponse {
    fn new(error_type: &str, message: String) -> Self {
        Self {
            error: error_type.to_string(),
            message,
            correlation_id: None,
            details: None,
        }
    }

    /// Body for unexpected failures: a generic message plus a correlation id
    /// that ties the response to the logged error.
    fn unexpected(error_type: &str, correlation_id: Uuid, detail: String) -> Self {
        Self {
            error: error_type.to_string(),
            message: format!(
                "An unexpected error occurred. Reference: {}",
                correlation_id
            ),
            correlation_id: Some(correlation_id.to_string()),
            details: expose_internal_errors().then_some(detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::NotFound(msg) => ErrorResponse::new("not_found", msg.clone()),
            AppError::BadRequest(msg) => ErrorResponse::new("bad_request", msg.clone()),
            AppError::BusinessRule(msg) => ErrorResponse::new("business_rule", msg.clone()),
            AppError::Unauthorized(msg) => ErrorResponse::new("unauthorized", msg.clone()),
            AppError::Forbidden(msg) => ErrorResponse::new("forbidden", msg.clone()),
            AppError::Conflict(msg) => ErrorResponse::new("conflict", msg.clone()),
            AppError::Validation(msg) => ErrorResponse::new("validation", msg.clone()),
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                ErrorResponse::new("jwt_error", "Invalid or expired token".to_string())
            }
            AppError::Database(e) => {
                let correlation_id = Uuid::new_v4();
                tracing::error!(%correlation_id, "Database error: {:?}", e);
                ErrorResponse::unexpected("database_error", correlation_id, e.to_string())
            }
            AppError::Internal(e) => {
                let correlation_id = Uuid::new_v4();
                tracing::error!(%correlation_id, "Internal error: {:?}", e);
                ErrorResponse::unexpected("internal_error", correlation_id, format!("{:#}", e))
            }
        };

        (status, Json(body)).into_response()
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
