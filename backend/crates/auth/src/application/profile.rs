//! Profile Use Cases
//!
//! Reading and editing the caller's own account and provider profile.

use std::sync::Arc;

use chrono::Utc;
use kernel::i18n::{Language, LocalizedText};
use kernel::id::UserId;

use crate::domain::entity::{provider_profile::ProviderProfile, user::User};
use crate::domain::repository::{ProviderProfileRepository, UserRepository};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// A user together with their provider profile (providers only)
#[derive(Debug, Clone)]
pub struct UserWithProfile {
    pub user: User,
    pub profile: Option<ProviderProfile>,
}

/// Editable account fields; `None` leaves a field unchanged and an empty
/// string clears an optional one.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub language: Option<Language>,
}

/// Editable provider fields, same conventions as [`ProfileChanges`]
#[derive(Debug, Clone, Default)]
pub struct ProviderProfileChanges {
    pub business_name: Option<String>,
    pub description: Option<LocalizedText>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub experience_years: Option<i32>,
    pub service_radius_km: Option<i32>,
}

fn clearable(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

pub struct ProfileUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    repo: Arc<R>,
}

impl<R> ProfileUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, user_id: &UserId) -> AuthResult<UserWithProfile> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let profile = if user.is_provider() {
            self.repo.find_by_user_id(&user.id).await?
        } else {
            None
        };
        Ok(UserWithProfile { user, profile })
    }

    pub async fn update(
        &self,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> AuthResult<UserWithProfile> {
        let mut current = self.get(user_id).await?;
        let user = &mut current.user;

        if let Some(first_name) = changes.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = changes.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(phone) = changes.phone {
            user.phone = clearable(phone);
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = clearable(avatar);
        }
        if let Some(language) = changes.language {
            user.language = language;
        }
        user.touch();

        self.repo.update(user).await?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(current)
    }

    /// Creates the profile when the provider has none yet
    pub async fn update_provider_profile(
        &self,
        user_id: &UserId,
        changes: ProviderProfileChanges,
    ) -> AuthResult<UserWithProfile> {
        let current = self.get(user_id).await?;
        if current.user.role != UserRole::Provider {
            return Err(AuthError::RoleNotAllowed(current.user.role));
        }

        let mut profile = current
            .profile
            .unwrap_or_else(|| ProviderProfile::empty(current.user.id));

        if let Some(business_name) = changes.business_name {
            profile.business_name = clearable(business_name);
        }
        if let Some(description) = changes.description {
            profile.description = description.normalized();
        }
        if let Some(address) = changes.address {
            profile.address = clearable(address);
        }
        if let Some(city) = changes.city {
            profile.city = clearable(city);
        }
        if let Some(website) = changes.website {
            profile.website = clearable(website);
        }
        if changes.experience_years.is_some() {
            profile.experience_years = changes.experience_years;
        }
        if changes.service_radius_km.is_some() {
            profile.service_radius_km = changes.service_radius_km;
        }
        profile.updated_at = Utc::now();

        self.repo.upsert(&profile).await?;
        tracing::info!(user_id = %current.user.id, "Provider profile updated");

        Ok(UserWithProfile {
            user: current.user,
            profile: Some(profile),
        })
    }
}
