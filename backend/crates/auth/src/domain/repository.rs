//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::UserId;
use kernel::pagination::PageRequest;

use crate::domain::entity::{provider_profile::ProviderProfile, user::User};
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::AuthResult;

/// Admin user listing filter
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    /// Case-insensitive match on email, first or last name
    pub search: Option<String>,
}

/// Public provider directory filter
#[derive(Debug, Clone, Default)]
pub struct ProviderFilter {
    pub city: Option<String>,
    /// Case-insensitive match on names or business name
    pub search: Option<String>,
}

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user and, when given, its provider profile in one transaction.
    ///
    /// Fails with `AuthError::EmailTaken` when the email is already registered.
    async fn create(&self, user: &User, profile: Option<&ProviderProfile>) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_oauth(&self, provider: &str, subject: &str) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Persist every mutable column of the user
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Newest first; returns the page and the total match count
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> AuthResult<(Vec<User>, u64)>;
}

/// Provider profile repository trait
#[trait_variant::make(ProviderProfileRepository: Send)]
pub trait LocalProviderProfileRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<ProviderProfile>>;

    /// Insert or replace the profile of `profile.user_id`
    async fn upsert(&self, profile: &ProviderProfile) -> AuthResult<()>;

    /// Active providers with their profiles, newest first
    async fn list_providers(
        &self,
        filter: &ProviderFilter,
        page: PageRequest,
    ) -> AuthResult<(Vec<(User, ProviderProfile)>, u64)>;
}

/// Everything the auth handlers need from storage
pub trait AuthStore:
    UserRepository + ProviderProfileRepository + Clone + Send + Sync + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository + ProviderProfileRepository + Clone + Send + Sync + 'static
{
}
