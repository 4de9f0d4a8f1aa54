//! Client identification utilities
//!
//! Reading caller credentials from HTTP headers.

use axum::http::{HeaderMap, header};

/// Bearer token from the `Authorization` header
///
/// The scheme is matched case-insensitively; an empty token counts as absent.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
