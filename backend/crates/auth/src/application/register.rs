//! Register Use Case
//!
//! Creates a new account (and an empty provider profile for providers).

use std::sync::Arc;

use kernel::i18n::Language;
use serde_json::json;

use crate::application::config::AuthConfig;
use crate::application::profile::UserWithProfile;
use crate::application::{Session, issue_token};
use crate::domain::entity::{provider_profile::ProviderProfile, user::User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub language: Option<Language>,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<Session> {
        let email = Email::new(&input.email)
            .map_err(|e| AuthError::invalid_field("email", e.message(), json!(input.email)))?;

        if !input.role.is_self_assignable() {
            return Err(AuthError::invalid_field(
                "role",
                "Role must be CUSTOMER or PROVIDER",
                json!(input.role),
            ));
        }

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let raw_password = RawPassword::new(input.password)
            .map_err(|msg| AuthError::invalid_field("password", msg, json!(null)))?;
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let mut user = User::new(
            email,
            Some(password_hash),
            input.first_name.trim().to_string(),
            input.last_name.trim().to_string(),
            input.role,
        );
        user.phone = input.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        if let Some(language) = input.language {
            user.language = language;
        }

        let profile = user.is_provider().then(|| ProviderProfile::empty(user.id));

        // Unique violations from a concurrent registration surface as EmailTaken.
        self.user_repo.create(&user, profile.as_ref()).await?;

        let issued = issue_token(&self.config, &user)?;

        tracing::info!(
            user_id = %user.id,
            role = %user.role,
            "User registered"
        );

        Ok(Session {
            token: issued.token,
            user: UserWithProfile { user, profile },
        })
    }
}
