//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, routers, middleware
//!
//! ## Features
//! - Email + password registration and login
//! - OAuth sign-in relayed by the frontend (shared-secret protected)
//! - Stateless HS256 bearer tokens with refresh of recently expired tokens
//! - Customer / Provider / Admin roles; provider profiles and directory
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional pepper
//! - Login failures are indistinguishable to the caller
//! - Role and active status are read from the database on every request

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::AuthUser;
pub use application::config::AuthConfig;
pub use domain::value_object::user_role::UserRole;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::{AuthContext, AuthMiddlewareState, authenticate};
pub use presentation::router::{auth_router, users_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
