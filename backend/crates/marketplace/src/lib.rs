//! Marketplace Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL implementation
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Features
//! - Service catalog with localized titles, categories and subcategories
//! - Bookings with a provider-driven status workflow and customer cancellation
//! - Reviews of completed bookings; service ratings recomputed in the same
//!   transaction under a row lock on the service
//! - Direct and booking-attached messages
//! - In-app notifications written as a side effect of the above
//!
//! Authentication comes from the `auth` crate: the routers expect
//! `auth::authenticate` to run in front of them.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::MarketConfig;
pub use domain::repository::MarketStore;
pub use error::{MarketError, MarketResult};
pub use infra::postgres::PgMarketRepository;
pub use presentation::router::{marketplace_router, marketplace_router_generic};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
