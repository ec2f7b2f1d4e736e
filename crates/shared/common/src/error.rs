//! Unified error handling for both HTTP services.
//!
//! Client-recoverable conditions map to specific statuses. Everything else
//! falls through to a generic 500 whose body carries no detail; the detail
//! is only logged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("User is not allowed to modify this resource")]
    OwnershipDenied,

    /// Login failure. Unknown email and wrong password are deliberately
    /// indistinguishable.
    #[error("User with email {0} was not found.")]
    InvalidCredentials(String),

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    EmptyResult(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    // External service errors
    #[error("Remote aggregation failed")]
    RemoteAggregation(String),

    #[error("Ambiguous identity")]
    AmbiguousIdentity(String),

    #[cfg(feature = "database")]
    #[error("Database error")]
    Persistence(#[from] sea_orm::DbErr),

    #[cfg(feature = "jwt")]
    #[error("Authentication error")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::OwnershipDenied => "FORBIDDEN",
            AppError::InvalidCredentials(_) => "NOT_FOUND",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::EmptyResult(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::RemoteAggregation(_) => "INTERNAL_ERROR",
            AppError::AmbiguousIdentity(_) => "INTERNAL_ERROR",
            #[cfg(feature = "database")]
            AppError::Persistence(_) => "INTERNAL_ERROR",
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => "UNAUTHORIZED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            #[cfg(feature = "jwt")]
            AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::OwnershipDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::EmptyResult(_) | AppError::InvalidCredentials(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::RemoteAggregation(msg) => {
                tracing::error!("Remote aggregation failed: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::AmbiguousIdentity(msg) => {
                tracing::error!("Ambiguous identity: {}", msg);
                "An internal error occurred".to_string()
            }
            #[cfg(feature = "database")]
            AppError::Persistence(e) => {
                tracing::error!("Database error: {:?}", e);
                "An internal error occurred".to_string()
            }
            #[cfg(feature = "jwt")]
            AppError::Jwt(e) => {
                tracing::debug!("JWT error: {:?}", e);
                "Invalid or expired token".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::Validation(msg),
            DomainError::Password(msg) => AppError::Validation(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Catch-all boundary for panics inside a handler: a bare 500, detail only logged.
pub fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::internal(detail).into_response()
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    /// "`{entity}` with id `{id}` was not found."
    pub fn not_found(entity: &str, id: Uuid) -> Self {
        AppError::NotFound(format!("{} with id {} was not found.", entity, id))
    }

    /// Lookup by email found nothing.
    pub fn email_not_found(email: &str) -> Self {
        AppError::NotFound(format!("User with email {} was not found.", email))
    }

    pub fn empty_result(msg: impl Into<String>) -> Self {
        AppError::EmptyResult(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        AppError::RemoteAggregation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_specific_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(AppError::not_found("Product", id).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::empty_result("none").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::OwnershipDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InvalidCredentials("a@b.c".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_not_found_message_names_the_id() {
        let id = Uuid::new_v4();
        assert_eq!(
            AppError::not_found("Product", id).user_message(),
            format!("Product with id {} was not found.", id)
        );
    }

    #[test]
    fn test_login_failure_reads_like_missing_email() {
        assert_eq!(
            AppError::InvalidCredentials("a@b.c".into()).user_message(),
            AppError::email_not_found("a@b.c").user_message()
        );
    }

    #[test]
    fn test_panic_becomes_generic_500() {
        let response = panic_response(Box::new("index out of bounds".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = AppError::remote("connection refused to 10.0.0.3");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.user_message().contains("10.0.0.3"));
    }
}
