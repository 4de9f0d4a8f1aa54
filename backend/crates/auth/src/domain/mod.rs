//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{provider_profile::ProviderProfile, user::User};
pub use repository::{AuthStore, ProviderProfileRepository, UserRepository};
