//! Change Password Use Case

use std::sync::Arc;

use kernel::id::UserId;
use serde_json::json;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

pub struct ChangePasswordInput {
    /// May be omitted only by accounts that have no password yet (OAuth)
    pub current_password: Option<String>,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> ChangePasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, user_id: &UserId, input: ChangePasswordInput) -> AuthResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(existing) = &user.password {
            let current = input.current_password.ok_or_else(|| {
                AuthError::invalid_field(
                    "currentPassword",
                    "Current password is required",
                    json!(null),
                )
            })?;
            if !existing.verify(&RawPassword::for_login(current), self.config.pepper()) {
                return Err(AuthError::WrongCurrentPassword);
            }
        }

        let raw = RawPassword::new(input.new_password)
            .map_err(|msg| AuthError::invalid_field("newPassword", msg, json!(null)))?;
        user.set_password(UserPassword::from_raw(&raw, self.config.pepper())?);
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }
}
