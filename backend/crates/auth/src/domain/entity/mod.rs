//! Entities

pub mod provider_profile;
pub mod user;
