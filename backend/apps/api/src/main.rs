//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use auth::{AuthMiddlewareState, PgAuthRepository, auth_router, authenticate, users_router};
use axum::{
    Json, Router, http,
    http::{Method, header},
    routing::get,
};
use marketplace::{PgMarketRepository, marketplace_router};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{DEFAULT_LOG_FILTER, ServerConfig};

async fn health() -> Json<Value> {
    Json(json!({ "success": true, "message": "OK" }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!(max_connections = config.max_connections, "Connected to database");

    // Run migrations
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("Migrations completed");

    let auth_repo = PgAuthRepository::new(pool.clone());
    let market_repo = PgMarketRepository::new(pool.clone());

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            http::HeaderName::from_static(auth::presentation::handlers::OAUTH_SECRET_HEADER),
        ]))
        .allow_credentials(true);

    // Build router; every API route sees the resolved caller
    let app = Router::new()
        .nest(
            "/api/auth",
            auth_router(auth_repo.clone(), config.auth.clone()),
        )
        .nest(
            "/api/users",
            users_router(auth_repo.clone(), config.auth.clone()),
        )
        .nest("/api", marketplace_router(market_repo, config.market.clone()))
        .layer(axum::middleware::from_fn_with_state(
            AuthMiddlewareState::new(auth_repo, config.auth.clone()),
            authenticate::<PgAuthRepository>,
        ))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
