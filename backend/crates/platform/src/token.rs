//! Bearer Tokens (HS256 JWT)
//!
//! Access tokens carry `{userId, email, role, iat, exp}`. Refresh re-validates
//! the signature but ignores expiry, accepting tokens up to a configurable
//! window past `exp`.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("Token is too old to refresh")]
    RefreshWindowElapsed,

    #[error("Token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies tokens with a single HMAC secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    refresh_window: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration, refresh_window: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            refresh_window,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid, email: &str, role: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, email, role, Utc::now())
    }

    /// Issue with an explicit `iat`
    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        role: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            user_id,
            email: email.to_string(),
            role: role.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }

    /// Verify signature only; the token must not have expired more than the refresh window ago.
    pub fn verify_for_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_for_refresh_at(token, Utc::now())
    }

    pub fn verify_for_refresh_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)?;

        if now.timestamp() - claims.exp > self.refresh_window.num_seconds() {
            return Err(TokenError::RefreshWindowElapsed);
        }
        Ok(claims)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .field("refresh_window", &self.refresh_window)
            .finish_non_exhaustive()
    }
}
