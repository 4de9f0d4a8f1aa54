//! Client Configuration

use std::time::Duration;

use url::Url;

use crate::error::ClientResult;

/// Used when neither an environment variable nor an origin is available
pub const DEFAULT_BASE_URL: &str = "http://localhost:31113/api";

/// Checked in order; the first non-empty value wins
pub const BASE_URL_VARS: [&str; 2] = ["NEXT_PUBLIC_API_URL", "API_URL"];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root including the `/api` prefix, without a trailing slash
    pub base_url: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Ok(Self {
            base_url: Url::parse(base_url.trim_end_matches('/'))?,
            timeout: Duration::from_secs(30),
        })
    }

    /// Base URL from `NEXT_PUBLIC_API_URL`, then `API_URL`, then
    /// `<origin>/api`, then [`DEFAULT_BASE_URL`]
    pub fn from_env(origin: Option<&str>) -> ClientResult<Self> {
        Self::new(&resolve_base_url(|name| std::env::var(name).ok(), origin))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `path` starts with `/`, e.g. `/services/{id}`
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

pub fn resolve_base_url<F>(lookup: F, origin: Option<&str>) -> String
where
    F: Fn(&str) -> Option<String>,
{
    BASE_URL_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .or_else(|| {
            origin
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(|o| format!("{}/api", o.trim_end_matches('/')))
        })
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}
