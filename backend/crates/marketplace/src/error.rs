//! Marketplace Error Types
//!
//! Marketplace-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use auth::AuthError;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, field::FieldError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::booking_status::BookingStatus;

/// Marketplace result type alias
pub type MarketResult<T> = Result<T, MarketError>;

#[derive(Debug, Error)]
pub enum MarketError {
    /// Authentication or role failure raised by the auth crate
    #[error(transparent)]
    Auth(#[from] AuthError),

    // --- 404 ---
    #[error("Service not found")]
    ServiceNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Review not found")]
    ReviewNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Notification not found")]
    NotificationNotFound,

    #[error("Receiver not found")]
    ReceiverNotFound,

    // --- 403 ---
    #[error("Not authorized to modify this service")]
    NotServiceOwner,

    #[error("Not authorized to access this booking")]
    NotBookingParticipant,

    #[error("Only the provider can update the booking status")]
    NotBookingProvider,

    #[error("Only the customer can cancel this booking")]
    NotBookingCustomer,

    #[error("Not authorized to review this booking")]
    NotBookingOwner,

    #[error("Not authorized to modify this review")]
    NotReviewAuthor,

    #[error("Only the reviewed provider can respond")]
    NotReviewedProvider,

    #[error("Not authorized to read this message")]
    NotMessageReceiver,

    #[error("Sender and receiver must both be participants of the booking")]
    NotConversationParticipant,

    // --- 400 ---
    #[error("Invalid category")]
    InvalidCategory,

    #[error("Subcategory does not belong to the category")]
    InvalidSubcategory,

    #[error("Slug is already in use")]
    SlugTaken,

    #[error("Service is not available for booking")]
    ServiceNotBookable,

    #[error("You cannot book your own service")]
    SelfBooking,

    #[error("Booking is already {}", .0.label())]
    AlreadyInStatus(BookingStatus),

    #[error("Cannot change booking status from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Only pending or confirmed bookings can be cancelled")]
    NotCancellable(BookingStatus),

    #[error("Booking was updated by someone else, please reload")]
    BookingStatusChanged,

    #[error("You can only review completed bookings")]
    BookingNotCompleted,

    #[error("You have already reviewed this booking")]
    AlreadyReviewed,

    #[error("You cannot send a message to yourself")]
    SelfMessage,

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    // --- 500 ---
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Single-field validation failure
    pub fn invalid_field(
        field: &str,
        message: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        MarketError::Validation(vec![FieldError::new(field, message, value)])
    }

    pub fn kind(&self) -> ErrorKind {
        use MarketError::*;
        match self {
            Auth(e) => e.kind(),
            ServiceNotFound | CategoryNotFound | BookingNotFound | ReviewNotFound
            | MessageNotFound | NotificationNotFound | ReceiverNotFound => ErrorKind::NotFound,
            NotServiceOwner
            | NotBookingParticipant
            | NotBookingProvider
            | NotBookingCustomer
            | NotBookingOwner
            | NotReviewAuthor
            | NotReviewedProvider
            | NotMessageReceiver
            | NotConversationParticipant => ErrorKind::Forbidden,
            InvalidCategory
            | InvalidSubcategory
            | SlugTaken
            | ServiceNotBookable
            | SelfBooking
            | AlreadyInStatus(_)
            | InvalidTransition { .. }
            | NotCancellable(_)
            | BookingStatusChanged
            | BookingNotCompleted
            | AlreadyReviewed
            | SelfMessage
            | Validation(_) => ErrorKind::BadRequest,
            Database(_) | Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            MarketError::Auth(e) => e.to_app_error(),
            MarketError::Validation(errors) => AppError::validation(errors.clone()),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    fn log(&self) {
        match self {
            MarketError::Database(e) => {
                tracing::error!(error = %e, "Marketplace database error");
            }
            MarketError::Internal(msg) => {
                tracing::error!(message = %msg, "Marketplace internal error");
            }
            other if other.kind() == ErrorKind::Forbidden => {
                tracing::warn!(error = %other, "Forbidden marketplace access");
            }
            _ => {
                tracing::debug!(error = %self, "Marketplace error");
            }
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        match self {
            MarketError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

impl From<AppError> for MarketError {
    fn from(err: AppError) -> Self {
        if err.is_server_error() {
            MarketError::Internal(err.to_string())
        } else if !err.errors().is_empty() {
            MarketError::Validation(err.errors().to_vec())
        } else {
            MarketError::Validation(vec![FieldError::new(
                "request",
                err.message(),
                serde_json::Value::Null,
            )])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(
            MarketError::AlreadyInStatus(BookingStatus::Cancelled).to_string(),
            "Booking is already cancelled"
        );
        assert_eq!(
            MarketError::InvalidTransition {
                from: BookingStatus::Completed,
                to: BookingStatus::Pending
            }
            .to_string(),
            "Cannot change booking status from completed to pending"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(MarketError::ServiceNotFound.kind().status_code(), 404);
        assert_eq!(MarketError::NotBookingProvider.kind().status_code(), 403);
        assert_eq!(MarketError::AlreadyReviewed.kind().status_code(), 400);
        assert_eq!(
            MarketError::Auth(AuthError::MissingToken).kind().status_code(),
            401
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let app = MarketError::Internal("pool exhausted".into()).to_app_error();
        assert_eq!(app.public_message(), "Internal server error");
    }
}
