//! Marketplace API Client
//!
//! Typed access to the REST API for frontends and tools.
//!
//! - `ApiClient` attaches the stored bearer token to every request
//! - expired tokens are refreshed once and the failed requests replayed
//! - a failed refresh clears the session and fires `on_session_expired`

mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::OAUTH_SECRET_HEADER;
pub use client::{ApiClient, SessionExpiredHook};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
