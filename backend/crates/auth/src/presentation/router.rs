//! Auth Routers
//!
//! Both routers expect the [`authenticate`](super::middleware::authenticate)
//! layer to run in front of them.

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AuthStore;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_admin;

/// Create the `/api/auth` router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic `/api/auth` router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: AuthStore,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/oauth", post(handlers::oauth::<R>))
        .route("/me", get(handlers::me::<R>))
        .route("/logout", post(handlers::logout))
        .route("/change-password", put(handlers::change_password::<R>))
        .with_state(state)
}

/// Create the `/api/users` router with PostgreSQL repository
pub fn users_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    users_router_generic(repo, config)
}

/// Create a generic `/api/users` router for any repository implementation
pub fn users_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: AuthStore,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    let admin = Router::new()
        .route("/", get(handlers::list_users::<R>))
        .route("/{id}/status", patch(handlers::update_status::<R>))
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route(
            "/profile",
            get(handlers::me::<R>).put(handlers::update_profile::<R>),
        )
        .route(
            "/provider-profile",
            put(handlers::update_provider_profile::<R>),
        )
        .route("/providers", get(handlers::list_providers::<R>))
        .route("/providers/{id}", get(handlers::get_provider::<R>))
        .merge(admin)
        .with_state(state)
}
