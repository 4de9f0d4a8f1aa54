//! Server Configuration
//!
//! Read once at startup from the process environment (after `.env`).

use std::env;
use std::str::FromStr;

use anyhow::{Context, bail};
use auth::AuthConfig;
use auth::config::{DEFAULT_REFRESH_WINDOW_HOURS, DEFAULT_TOKEN_TTL_HOURS};
use chrono::Duration;
use marketplace::MarketConfig;

pub const DEFAULT_PORT: u16 = 31113;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
pub const DEFAULT_LOG_FILTER: &str = "api=info,auth=info,marketplace=info,tower_http=info";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub market: MarketConfig,
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a valid number, got {raw:?}")),
        None => Ok(default),
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let token_ttl = Duration::hours(parsed("JWT_EXPIRES_IN_HOURS", DEFAULT_TOKEN_TTL_HOURS)?);
        let refresh_window = Duration::hours(parsed(
            "JWT_REFRESH_WINDOW_HOURS",
            DEFAULT_REFRESH_WINDOW_HOURS,
        )?);

        let mut auth = match var("JWT_SECRET") {
            Some(secret) => AuthConfig::new(secret.as_bytes(), token_ttl, refresh_window),
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using a random development secret");
                AuthConfig::new(
                    &platform::crypto::random_bytes(32),
                    token_ttl,
                    refresh_window,
                )
            }
            None => bail!("JWT_SECRET must be set in production"),
        };
        if let Some(pepper) = var("PASSWORD_PEPPER") {
            auth = auth.with_pepper(pepper.into_bytes());
        }
        if let Some(secret) = var("OAUTH_SHARED_SECRET") {
            auth = auth.with_oauth_secret(secret);
        }

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            database_url,
            max_connections: parsed("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            port: parsed("PORT", DEFAULT_PORT)?,
            frontend_origins,
            auth,
            market: MarketConfig::default(),
        })
    }
}
