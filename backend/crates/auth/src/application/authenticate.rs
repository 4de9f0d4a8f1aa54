//! Authenticate Use Case
//!
//! Resolves a bearer token to the current, active user.

use std::sync::Arc;

use kernel::id::UserId;
use serde::Serialize;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Caller identity attached to authenticated requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// `RoleNotAllowed` unless the caller has one of `allowed`
    pub fn ensure_role(&self, allowed: &[UserRole]) -> AuthResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AuthError::RoleNotAllowed(self.role))
        }
    }
}

pub struct AuthenticateUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> AuthenticateUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<AuthUser> {
        let claims = self.config.tokens.verify(token)?;

        // Role and status come from the database, not the token.
        let user = self
            .user_repo
            .find_by_id(&UserId::from_uuid(claims.user_id))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.can_login() {
            return Err(AuthError::AccountDeactivated);
        }

        Ok(AuthUser {
            id: user.id,
            email: user.email.into_db(),
            role: user.role,
        })
    }
}
