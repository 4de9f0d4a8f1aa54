//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, field::FieldError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::user_role::UserRole;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists with this email")]
    EmailTaken,

    /// Unknown email, wrong password, inactive or password-less account
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authorized, no token")]
    MissingToken,

    #[error("Not authorized, token failed")]
    InvalidToken,

    #[error("Not authorized, token expired")]
    TokenExpired,

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Session expired, please log in again")]
    RefreshRejected,

    #[error("Invalid OAuth request")]
    OAuthRejected,

    #[error("User role {0} is not authorized to access this route")]
    RoleNotAllowed(UserRole),

    #[error("User not found")]
    UserNotFound,

    #[error("Provider not found")]
    ProviderNotFound,

    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    #[error("You cannot deactivate your own account")]
    CannotDeactivateSelf,

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Single-field validation failure
    pub fn invalid_field(
        field: &str,
        message: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        AuthError::Validation(vec![FieldError::new(field, message, value)])
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::EmailTaken
            | AuthError::WrongCurrentPassword
            | AuthError::CannotDeactivateSelf
            | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::AccountDeactivated
            | AuthError::RefreshRejected
            | AuthError::OAuthRejected => ErrorKind::Unauthorized,
            AuthError::RoleNotAllowed(_) => ErrorKind::Forbidden,
            AuthError::UserNotFound | AuthError::ProviderNotFound => ErrorKind::NotFound,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(errors) => AppError::validation(errors.clone()),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidToken | AuthError::RefreshRejected | AuthError::OAuthRejected => {
                tracing::warn!(error = %self, "Rejected credentials");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_server_error() {
            AuthError::Internal(err.to_string())
        } else if !err.errors().is_empty() {
            AuthError::Validation(err.errors().to_vec())
        } else {
            AuthError::Validation(vec![FieldError::new(
                "request",
                err.message(),
                serde_json::Value::Null,
            )])
        }
    }
}

impl From<platform::token::TokenError> for AuthError {
    fn from(err: platform::token::TokenError) -> Self {
        use platform::token::TokenError;
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid(_) => AuthError::InvalidToken,
            TokenError::RefreshWindowElapsed => AuthError::RefreshRejected,
            TokenError::Signing(e) => AuthError::Internal(e.to_string()),
        }
    }
}
