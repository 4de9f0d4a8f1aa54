//! Client Error Types

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::FieldError;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response rendered through the API envelope
    #[error("{message} ({status})")]
    Api {
        status: StatusCode,
        message: String,
        errors: Vec<FieldError>,
    },

    /// The token could not be refreshed; stored credentials were cleared
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// 2xx envelope without the expected `data`
    #[error("Response did not contain data")]
    MissingData,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::SessionExpired => Some(StatusCode::UNAUTHORIZED),
            ClientError::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Field errors of a 400 validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClientError::Api { errors, .. } => errors,
            _ => &[],
        }
    }
}
