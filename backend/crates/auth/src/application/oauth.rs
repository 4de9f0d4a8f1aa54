//! OAuth Sign-in Use Case
//!
//! The frontend completes the provider flow and forwards the verified
//! identity here, authenticated by a shared secret. Accounts are matched by
//! provider subject, then by email (linking the identity), else created.

use std::sync::Arc;

use platform::crypto::constant_time_eq;
use serde_json::json;

use crate::application::config::AuthConfig;
use crate::application::profile::UserWithProfile;
use crate::application::{Session, issue_token};
use crate::domain::entity::user::User;
use crate::domain::repository::{ProviderProfileRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Identity asserted by the OAuth provider
pub struct OAuthInput {
    pub provider: String,
    pub provider_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

pub struct OAuthUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> OAuthUseCase<R>
where
    R: UserRepository + ProviderProfileRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    /// Constant-time check of the caller's secret against the configured one
    pub fn verify_secret(&self, presented: Option<&str>) -> AuthResult<()> {
        match (self.config.oauth_shared_secret.as_deref(), presented) {
            (Some(expected), Some(given))
                if constant_time_eq(expected.as_bytes(), given.as_bytes()) =>
            {
                Ok(())
            }
            _ => Err(AuthError::OAuthRejected),
        }
    }

    pub async fn execute(&self, secret: Option<&str>, input: OAuthInput) -> AuthResult<Session> {
        self.verify_secret(secret)?;

        let provider = input.provider.trim().to_lowercase();
        let subject = input.provider_id.trim().to_string();
        let email = Email::new(&input.email)
            .map_err(|e| AuthError::invalid_field("email", e.message(), json!(input.email)))?;

        let mut user = match self.repo.find_by_oauth(&provider, &subject).await? {
            Some(user) => user,
            None => match self.repo.find_by_email(&email).await? {
                Some(mut user) => {
                    user.link_oauth(&provider, &subject);
                    if user.avatar.is_none() {
                        user.avatar = input.avatar.clone();
                    }
                    tracing::info!(
                        user_id = %user.id,
                        provider = %provider,
                        "Linked OAuth identity"
                    );
                    user
                }
                None => {
                    let mut user = User::new(
                        email,
                        None,
                        input.first_name.trim().to_string(),
                        input.last_name.trim().to_string(),
                        UserRole::Customer,
                    );
                    user.link_oauth(&provider, &subject);
                    user.avatar = input.avatar.clone();
                    self.repo.create(&user, None).await?;
                    tracing::info!(
                        user_id = %user.id,
                        provider = %provider,
                        "User registered via OAuth"
                    );
                    user
                }
            },
        };

        if !user.can_login() {
            return Err(AuthError::AccountDeactivated);
        }

        user.record_login();
        self.repo.update(&user).await?;

        let issued = issue_token(&self.config, &user)?;
        let profile = if user.is_provider() {
            self.repo.find_by_user_id(&user.id).await?
        } else {
            None
        };

        Ok(Session {
            token: issued.token,
            user: UserWithProfile { user, profile },
        })
    }
}
