//! Typed endpoint wrappers, one module per API resource

mod auth;
mod bookings;
mod messages;
mod notifications;
mod reviews;
mod services;

pub use auth::OAUTH_SECRET_HEADER;
