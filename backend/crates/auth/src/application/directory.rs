//! Directory Use Cases
//!
//! Public provider directory and admin user management.

use std::sync::Arc;

use kernel::id::UserId;
use kernel::pagination::{Page, PageRequest};

use crate::application::profile::UserWithProfile;
use crate::domain::entity::user::User;
use crate::domain::repository::{
    ProviderFilter, ProviderProfileRepository, UserFilter, UserRepository,
};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Admin status update
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusChange {
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

pub struct DirectoryUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    repo: Arc<R>,
}

impl<R> DirectoryUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list_providers(
        &self,
        filter: &ProviderFilter,
        page: PageRequest,
    ) -> AuthResult<Page<UserWithProfile>> {
        let (rows, total) = self.repo.list_providers(filter, page).await?;
        let items = rows
            .into_iter()
            .map(|(user, profile)| UserWithProfile {
                user,
                profile: Some(profile),
            })
            .collect();
        Ok(Page::new(items, page, total))
    }

    /// Active provider only
    pub async fn get_provider(&self, user_id: &UserId) -> AuthResult<UserWithProfile> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .filter(|u| u.role == UserRole::Provider && u.is_active)
            .ok_or(AuthError::ProviderNotFound)?;
        let profile = self.repo.find_by_user_id(&user.id).await?;
        Ok(UserWithProfile { user, profile })
    }

    pub async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> AuthResult<Page<User>> {
        let (users, total) = self.repo.list(filter, page).await?;
        Ok(Page::new(users, page, total))
    }

    pub async fn set_status(
        &self,
        admin_id: &UserId,
        target_id: &UserId,
        change: StatusChange,
    ) -> AuthResult<User> {
        if admin_id == target_id && change.is_active == Some(false) {
            return Err(AuthError::CannotDeactivateSelf);
        }

        let mut user = self
            .repo
            .find_by_id(target_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(is_active) = change.is_active {
            user.is_active = is_active;
        }
        if let Some(is_verified) = change.is_verified {
            user.is_verified = is_verified;
        }
        user.touch();
        self.repo.update(&user).await?;

        tracing::info!(
            admin_id = %admin_id,
            user_id = %user.id,
            is_active = user.is_active,
            is_verified = user.is_verified,
            "User status changed"
        );
        Ok(user)
    }
}
