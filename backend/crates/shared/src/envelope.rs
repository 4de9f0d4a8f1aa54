//! Response envelope
//!
//! Every API response has the shape
//! `{ success, message?, data?, errors?, pagination? }`.
//! Successes are built with [`ApiResponse`]; failures come from
//! [`AppError`](crate::error::app_error::AppError)'s `IntoResponse`.

use serde::Serialize;

use crate::error::field::FieldError;
use crate::pagination::{Page, Pagination};

/// Successful envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    /// 200 with data
    pub fn ok(data: T) -> Self {
        Self {
            status: 200,
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
        }
    }

    /// 201 with data
    pub fn created(data: T) -> Self {
        Self {
            status: 201,
            ..Self::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }
}

impl ApiResponse<()> {
    /// 200 with only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: 200,
            success: true,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// 200 with a list and its pagination block
    pub fn page(page: Page<T>) -> Self {
        Self {
            status: 200,
            success: true,
            message: None,
            data: Some(page.items),
            pagination: Some(page.pagination),
        }
    }
}

/// Failure envelope body, borrowed from the error being rendered
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub success: bool,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a [FieldError]>,
}

#[cfg(feature = "axum")]
impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageRequest;
    use serde_json::json;

    #[test]
    fn test_ok_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::ok(json!({"id": 1}))).unwrap();
        assert_eq!(body, json!({"success": true, "data": {"id": 1}}));
    }

    #[test]
    fn test_created_status() {
        let resp = ApiResponse::created(1).with_message("Booking created successfully");
        assert_eq!(resp.status_code(), 201);
        let body = serde_json::to_value(resp).unwrap();
        assert_eq!(body["message"], "Booking created successfully");
    }

    #[test]
    fn test_message_only() {
        let body = serde_json::to_value(ApiResponse::message("Logged out")).unwrap();
        assert_eq!(body, json!({"success": true, "message": "Logged out"}));
    }

    #[test]
    fn test_page_envelope() {
        let req = PageRequest::new(2, 2);
        let page = Page::new(vec!["c", "d"], req, 5);
        let body = serde_json::to_value(ApiResponse::page(page)).unwrap();
        assert_eq!(
            body["pagination"],
            json!({"page": 2, "limit": 2, "total": 5, "pages": 3})
        );
        assert_eq!(body["data"], json!(["c", "d"]));
    }
}
