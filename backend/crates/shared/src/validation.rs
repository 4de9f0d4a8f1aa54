//! Request validation
//!
//! Request DTOs implement [`Validate`] and push failures into a [`Validator`].
//! All rules run; the collected failures become one
//! `400 "Validation failed"` with the `errors` list.
//!
//! With the `axum` feature, [`Valid<T>`] extracts a JSON body, validates it
//! and renders any failure (including malformed JSON) through the envelope.

use serde::Serialize;
use serde_json::Value;

use crate::error::app_error::{AppError, AppResult};
use crate::error::field::FieldError;

/// Maximum email length (RFC 5321)
pub const EMAIL_MAX_LENGTH: usize = 254;

/// A request type with field rules
pub trait Validate {
    fn validate(&self, v: &mut Validator);
}

/// Collects field failures
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure unconditionally
    pub fn push(&mut self, field: &str, message: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.errors.push(FieldError::new(field, message, value));
    }

    /// Record a failure when `ok` is false. Returns `ok`.
    pub fn check(
        &mut self,
        ok: bool,
        field: &str,
        message: impl Into<String>,
        value: impl Serialize,
    ) -> bool {
        if !ok {
            self.push(field, message, value);
        }
        ok
    }

    /// Present and not blank
    pub fn required(&mut self, field: &str, value: Option<&str>, message: &str) -> bool {
        let ok = value.is_some_and(|s| !s.trim().is_empty());
        self.check(ok, field, message, value)
    }

    /// Trimmed character count within `min..=max`
    pub fn length(
        &mut self,
        field: &str,
        value: &str,
        min: usize,
        max: usize,
        message: &str,
    ) -> bool {
        let len = value.trim().chars().count();
        self.check(len >= min && len <= max, field, message, value)
    }

    /// Like [`length`](Self::length) but skipped when absent
    pub fn optional_length(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
        message: &str,
    ) -> bool {
        match value {
            Some(s) => self.length(field, s, min, max, message),
            None => true,
        }
    }

    pub fn range<N>(&mut self, field: &str, value: N, min: N, max: N, message: &str) -> bool
    where
        N: PartialOrd + Serialize,
    {
        let ok = value >= min && value <= max;
        self.check(ok, field, message, value)
    }

    pub fn email(&mut self, field: &str, value: &str) -> bool {
        self.check(
            is_valid_email(value),
            field,
            "Please provide a valid email",
            value,
        )
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self.errors))
        }
    }
}

/// Run a value's rules
pub fn validate<T: Validate + ?Sized>(value: &T) -> AppResult<()> {
    let mut v = Validator::new();
    value.validate(&mut v);
    v.finish()
}

/// Basic structural email check on the trimmed, lower-cased address
pub fn is_valid_email(raw: &str) -> bool {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || email.len() > EMAIL_MAX_LENGTH {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }
    if local.is_empty() || local.len() > 64 || local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.is_empty() || !domain.contains('.') {
        return false;
    }
    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }
    if domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']) || domain.contains("..") {
        return false;
    }
    true
}

// ============================================================================
// Axum extractors (feature-gated)
// ============================================================================

/// Validated JSON body
#[cfg(feature = "axum")]
#[derive(Debug, Clone)]
pub struct Valid<T>(pub T);

#[cfg(feature = "axum")]
impl<T, S> axum::extract::FromRequest<S> for Valid<T>
where
    T: serde::de::DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(%rejection, "rejected request body");
                AppError::bad_request(rejection.body_text())
            })?;
        validate(&value)?;
        Ok(Valid(value))
    }
}

/// Path parameters whose parse failures are rendered as a 400 envelope
#[cfg(feature = "axum")]
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

#[cfg(feature = "axum")]
impl<T, S> axum::extract::FromRequestParts<S> for ValidPath<T>
where
    T: serde::de::DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(%rejection, "rejected path parameters");
                AppError::bad_request("Invalid id")
            })?;
        Ok(ValidPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Signup {
        email: String,
        password: Option<String>,
        rating: i32,
    }

    impl Validate for Signup {
        fn validate(&self, v: &mut Validator) {
            v.email("email", &self.email);
            if v.required("password", self.password.as_deref(), "Password is required") {
                v.length(
                    "password",
                    self.password.as_deref().unwrap_or_default(),
                    8,
                    128,
                    "Password must be between 8 and 128 characters",
                );
            }
            v.range("rating", self.rating, 1, 5, "Rating must be between 1 and 5");
        }
    }

    #[test]
    fn test_collects_every_failure() {
        let input = Signup {
            email: "bad".into(),
            password: None,
            rating: 7,
        };
        let err = validate(&input).unwrap_err();
        assert_eq!(err.status_code(), 400);
        let fields: Vec<&str> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password", "rating"]);
        assert_eq!(err.errors()[2].value, serde_json::json!(7));
    }

    #[test]
    fn test_valid_input_passes() {
        let input = Signup {
            email: "a@b.co".into(),
            password: Some("long-enough".into()),
            rating: 5,
        };
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email(" User+tag@Example.COM "));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@exa..mple.com"));
    }

    #[test]
    fn test_length_counts_chars() {
        let mut v = Validator::new();
        assert!(v.length("name", "عمر", 1, 3, "bad"));
        assert!(!v.length("name", "   ", 1, 3, "Name is required"));
        assert!(v.has_errors());
    }
}
