//! Application Configuration
//!
//! Configuration for the Auth application layer.

use chrono::Duration;
use platform::token::TokenService;

/// Default token lifetime (7 days)
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;

/// Default refresh window past `exp` (7 days)
pub const DEFAULT_REFRESH_WINDOW_HOURS: i64 = 168;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Signs and verifies bearer tokens
    pub tokens: TokenService,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Secret the frontend presents on `/oauth`; the endpoint is closed when unset
    pub oauth_shared_secret: Option<String>,
}

impl AuthConfig {
    pub fn new(jwt_secret: &[u8], token_ttl: Duration, refresh_window: Duration) -> Self {
        Self {
            tokens: TokenService::new(jwt_secret, token_ttl, refresh_window),
            password_pepper: None,
            oauth_shared_secret: None,
        }
    }

    /// Create config with a random signing secret (for development)
    pub fn development() -> Self {
        let secret = platform::crypto::random_bytes(32);
        Self::new(
            &secret,
            Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            Duration::hours(DEFAULT_REFRESH_WINDOW_HOURS),
        )
    }

    pub fn with_pepper(mut self, pepper: impl Into<Vec<u8>>) -> Self {
        self.password_pepper = Some(pepper.into());
        self
    }

    pub fn with_oauth_secret(mut self, secret: impl Into<String>) -> Self {
        self.oauth_shared_secret = Some(secret.into());
        self
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
