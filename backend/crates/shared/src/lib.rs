//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of marketplace vocabulary:
//! - Common error types, result aliases and the response envelope
//! - Typed ID wrappers and localized text
//! - Pagination and request validation rules
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod field;
    pub mod kind;
}
pub mod envelope;
pub mod i18n;
pub mod id;
pub mod pagination;
pub mod validation;
