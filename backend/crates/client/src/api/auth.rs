//! `/auth`

use crate::client::{ApiClient, Call};
use crate::error::ClientResult;
use crate::models::{
    ChangePasswordRequest, LoginRequest, OAuthRequest, RegisterRequest, Session, User,
};

/// Header carrying the shared secret of `/auth/oauth`
pub const OAUTH_SECRET_HEADER: &str = "x-oauth-secret";

impl ApiClient {
    /// Registers and stores the new session
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<Session> {
        let session: Session = self
            .data(Call::post("/auth/register").json(request)?)
            .await?;
        self.store().save(session.clone())?;
        Ok(session)
    }

    /// Signs in and stores the session
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let session: Session = self.data(Call::post("/auth/login").json(&request)?).await?;
        self.store().save(session.clone())?;
        Ok(session)
    }

    /// Exchanges a completed OAuth provider flow for a session
    pub async fn oauth_sign_in(
        &self,
        request: &OAuthRequest,
        shared_secret: &str,
    ) -> ClientResult<Session> {
        let call = Call::post("/auth/oauth")
            .header(OAUTH_SECRET_HEADER, shared_secret)
            .json(request)?;
        let session: Session = self.data(call).await?;
        self.store().save(session.clone())?;
        Ok(session)
    }

    /// Current user; refreshes the stored copy
    pub async fn me(&self) -> ClientResult<User> {
        let user: User = self.data(Call::get("/auth/me")).await?;
        if let Some(mut session) = self.store().session() {
            session.user = user.clone();
            self.store().save(session)?;
        }
        Ok(user)
    }

    pub async fn change_password(
        &self,
        current_password: Option<&str>,
        new_password: &str,
    ) -> ClientResult<()> {
        let request = ChangePasswordRequest {
            current_password: current_password.map(str::to_string),
            new_password: new_password.to_string(),
        };
        self.message(Call::put("/auth/change-password").json(&request)?)
            .await?;
        Ok(())
    }

    /// Tokens are stateless; the local session is dropped even if the call fails
    pub async fn logout(&self) -> ClientResult<()> {
        if self.is_signed_in() {
            if let Err(e) = self.message(Call::post("/auth/logout")).await {
                tracing::debug!(error = %e, "Logout call failed");
            }
        }
        self.store().clear()
    }
}
