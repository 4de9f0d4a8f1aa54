//! Marketplace Routers
//!
//! Every router expects the `auth::authenticate` layer to run in front of
//! it. Routes mixing public and role-restricted methods check roles in the
//! handler; fully authenticated groups are guarded with `require_auth`.

use auth::middleware::require_auth;
use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;

use crate::application::MarketConfig;
use crate::domain::repository::MarketStore;
use crate::infra::postgres::PgMarketRepository;
use crate::presentation::handlers::{self, MarketAppState};

fn state<R: MarketStore>(repo: R, config: MarketConfig) -> MarketAppState<R> {
    MarketAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    }
}

/// Create the `/api` marketplace router with PostgreSQL repository
pub fn marketplace_router(repo: PgMarketRepository, config: MarketConfig) -> Router {
    marketplace_router_generic(repo, config)
}

/// All marketplace resources, nested under their prefixes
pub fn marketplace_router_generic<R>(repo: R, config: MarketConfig) -> Router
where
    R: MarketStore,
{
    Router::new()
        .nest("/services", services_router_generic(repo.clone(), config.clone()))
        .nest("/bookings", bookings_router_generic(repo.clone(), config.clone()))
        .nest("/reviews", reviews_router_generic(repo.clone(), config.clone()))
        .nest("/messages", messages_router_generic(repo.clone(), config.clone()))
        .nest("/notifications", notifications_router_generic(repo, config))
}

/// `/api/services`
pub fn services_router_generic<R>(repo: R, config: MarketConfig) -> Router
where
    R: MarketStore,
{
    Router::new()
        .route(
            "/",
            get(handlers::list_services::<R>).post(handlers::create_service::<R>),
        )
        .route(
            "/categories",
            get(handlers::list_categories::<R>).post(handlers::create_category::<R>),
        )
        .route(
            "/categories/{id}/subcategories",
            post(handlers::create_subcategory::<R>),
        )
        .route("/my", get(handlers::my_services::<R>))
        .route(
            "/{id}",
            get(handlers::get_service::<R>)
                .put(handlers::update_service::<R>)
                .delete(handlers::delete_service::<R>),
        )
        .with_state(state(repo, config))
}

/// `/api/bookings`
pub fn bookings_router_generic<R>(repo: R, config: MarketConfig) -> Router
where
    R: MarketStore,
{
    Router::new()
        .route(
            "/",
            get(handlers::list_bookings::<R>).post(handlers::create_booking::<R>),
        )
        .route("/{id}", get(handlers::get_booking::<R>))
        .route("/{id}/status", patch(handlers::update_booking_status::<R>))
        .route("/{id}/cancel", patch(handlers::cancel_booking::<R>))
        .route_layer(middleware::from_fn(require_auth))
        .with_state(state(repo, config))
}

/// `/api/reviews`
pub fn reviews_router_generic<R>(repo: R, config: MarketConfig) -> Router
where
    R: MarketStore,
{
    Router::new()
        .route("/", post(handlers::create_review::<R>))
        .route("/service/{service_id}", get(handlers::service_reviews::<R>))
        .route("/my", get(handlers::my_reviews::<R>))
        .route(
            "/{id}",
            put(handlers::update_review::<R>).delete(handlers::delete_review::<R>),
        )
        .route("/{id}/response", post(handlers::respond_to_review::<R>))
        .route("/{id}/approval", patch(handlers::set_review_approval::<R>))
        .with_state(state(repo, config))
}

/// `/api/messages`
pub fn messages_router_generic<R>(repo: R, config: MarketConfig) -> Router
where
    R: MarketStore,
{
    Router::new()
        .route("/", post(handlers::send_message::<R>))
        .route("/conversations", get(handlers::conversations::<R>))
        .route("/conversation/{user_id}", get(handlers::conversation::<R>))
        .route("/booking/{booking_id}", get(handlers::booking_messages::<R>))
        .route("/unread-count", get(handlers::unread_messages::<R>))
        .route("/{id}/read", patch(handlers::mark_message_read::<R>))
        .route_layer(middleware::from_fn(require_auth))
        .with_state(state(repo, config))
}

/// `/api/notifications`
pub fn notifications_router_generic<R>(repo: R, config: MarketConfig) -> Router
where
    R: MarketStore,
{
    Router::new()
        .route("/", get(handlers::list_notifications::<R>))
        .route("/unread-count", get(handlers::unread_notifications::<R>))
        .route("/read-all", patch(handlers::mark_all_notifications_read::<R>))
        .route("/{id}", delete(handlers::delete_notification::<R>))
        .route("/{id}/read", patch(handlers::mark_notification_read::<R>))
        .route_layer(middleware::from_fn(require_auth))
        .with_state(state(repo, config))
}
