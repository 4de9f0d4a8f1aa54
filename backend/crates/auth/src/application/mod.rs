//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod change_password;
pub mod config;
pub mod directory;
pub mod login;
pub mod oauth;
pub mod profile;
pub mod refresh;
pub mod register;

// Re-exports
pub use authenticate::{AuthUser, AuthenticateUseCase};
pub use change_password::{ChangePasswordInput, ChangePasswordUseCase};
pub use config::AuthConfig;
pub use directory::{DirectoryUseCase, StatusChange};
pub use login::{LoginInput, LoginUseCase};
pub use oauth::{OAuthInput, OAuthUseCase};
pub use profile::{ProfileChanges, ProfileUseCase, ProviderProfileChanges, UserWithProfile};
pub use refresh::RefreshUseCase;
pub use register::{RegisterInput, RegisterUseCase};

use platform::token::IssuedToken;

use crate::domain::entity::user::User;
use crate::error::AuthResult;

/// Token plus the user it was issued for
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserWithProfile,
}

pub(crate) fn issue_token(config: &AuthConfig, user: &User) -> AuthResult<IssuedToken> {
    Ok(config
        .tokens
        .issue(user.id.into_uuid(), user.email.as_str(), user.role.code())?)
}
