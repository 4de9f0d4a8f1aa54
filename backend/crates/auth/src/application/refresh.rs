//! Refresh Use Case
//!
//! Re-issues a token for a still-active user. Expired tokens are accepted as
//! long as their signature is valid and they are inside the refresh window.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::application::profile::UserWithProfile;
use crate::application::{Session, issue_token};
use crate::domain::repository::{ProviderProfileRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct RefreshUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> RefreshUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<Session> {
        let claims = self.config.tokens.verify_for_refresh(token).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token rejected");
            AuthError::RefreshRejected
        })?;

        let user_id = UserId::from_uuid(claims.user_id);
        let user = self
            .repo
            .find_by_id(&user_id)
            .await?
            .filter(|u| u.can_login())
            .ok_or(AuthError::RefreshRejected)?;

        let issued = issue_token(&self.config, &user)?;
        let profile = if user.is_provider() {
            self.repo.find_by_user_id(&user.id).await?
        } else {
            None
        };

        tracing::debug!(user_id = %user.id, "Token refreshed");

        Ok(Session {
            token: issued.token,
            user: UserWithProfile { user, profile },
        })
    }
}
