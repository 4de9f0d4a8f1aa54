//! Field-level validation errors
//!
//! Carried by [`AppError`](super::app_error::AppError) and rendered as the
//! `errors` array of the response envelope.

use serde::Serialize;
use serde_json::Value;

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Request field name as the client sent it (camelCase)
    pub field: String,
    /// Human readable message
    pub message: String,
    /// Offending value (`null` when absent)
    pub value: Value,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}
