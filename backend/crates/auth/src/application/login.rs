//! Login Use Case
//!
//! Email/password authentication. Every failure mode yields the same
//! `InvalidCredentials` so callers cannot enumerate accounts.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::profile::UserWithProfile;
use crate::application::{Session, issue_token};
use crate::domain::repository::{ProviderProfileRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<Session> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let mut user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_login() {
            tracing::warn!(user_id = %user.id, "Login attempt on deactivated account");
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = user
            .password
            .as_ref()
            .ok_or(AuthError::InvalidCredentials)?;

        let raw_password = RawPassword::for_login(input.password);
        if !password_hash.verify(&raw_password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        user.record_login();
        self.repo.update(&user).await?;

        let issued = issue_token(&self.config, &user)?;
        let profile = if user.is_provider() {
            self.repo.find_by_user_id(&user.id).await?
        } else {
            None
        };

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(Session {
            token: issued.token,
            user: UserWithProfile { user, profile },
        })
    }
}
