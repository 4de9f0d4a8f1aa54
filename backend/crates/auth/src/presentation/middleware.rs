//! Auth Middleware
//!
//! `authenticate` runs once per request, resolves the bearer token and stores
//! the outcome as an [`AuthContext`] extension. Handlers read it through the
//! [`AuthUser`] extractor; route groups can be guarded with [`require_auth`]
//! or one of the role guards.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, OptionalFromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use platform::client::extract_bearer_token;

use crate::application::config::AuthConfig;
use crate::application::{AuthUser, AuthenticateUseCase};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> AuthMiddlewareState<R>
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
        }
    }
}

/// Why a presented token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Invalid,
    Expired,
    Deactivated,
    /// The user could not be loaded
    Unavailable,
}

impl From<TokenRejection> for AuthError {
    fn from(rejection: TokenRejection) -> Self {
        match rejection {
            TokenRejection::Invalid => AuthError::InvalidToken,
            TokenRejection::Expired => AuthError::TokenExpired,
            TokenRejection::Deactivated => AuthError::AccountDeactivated,
            TokenRejection::Unavailable => AuthError::Internal("Failed to load user".into()),
        }
    }
}

/// Authentication outcome stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Anonymous,
    Authenticated(AuthUser),
    Rejected(TokenRejection),
}

impl AuthContext {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            AuthContext::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// The caller, or the error a protected route should answer with
    pub fn require(&self) -> AuthResult<&AuthUser> {
        match self {
            AuthContext::Authenticated(user) => Ok(user),
            AuthContext::Rejected(rejection) => Err((*rejection).into()),
            AuthContext::Anonymous => Err(AuthError::MissingToken),
        }
    }
}

/// Resolve the bearer token, if any, for every request
pub async fn authenticate<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: UserRepository + Clone + Send + Sync + 'static,
{
    // Owned so no borrow of the request is held across the lookup.
    let token = extract_bearer_token(req.headers()).map(str::to_owned);

    let context = match token {
        None => AuthContext::Anonymous,
        Some(token) => {
            let use_case = AuthenticateUseCase::new(state.repo.clone(), state.config.clone());
            match use_case.execute(&token).await {
                Ok(user) => AuthContext::Authenticated(user),
                Err(AuthError::TokenExpired) => AuthContext::Rejected(TokenRejection::Expired),
                Err(AuthError::AccountDeactivated) => {
                    AuthContext::Rejected(TokenRejection::Deactivated)
                }
                Err(AuthError::Database(e)) => {
                    tracing::error!(error = %e, "Failed to load user for token");
                    AuthContext::Rejected(TokenRejection::Unavailable)
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Bearer token rejected");
                    AuthContext::Rejected(TokenRejection::Invalid)
                }
            }
        }
    };

    req.extensions_mut().insert(context);
    next.run(req).await
}

fn context_of(req: &Request) -> AuthResult<&AuthUser> {
    req.extensions()
        .get::<AuthContext>()
        .ok_or(AuthError::MissingToken)?
        .require()
}

/// Reject unauthenticated requests with 401
pub async fn require_auth(req: Request, next: Next) -> AuthResult<Response> {
    context_of(&req)?;
    Ok(next.run(req).await)
}

/// Reject requests whose caller has none of `allowed` (401 / 403)
pub async fn require_roles(
    allowed: &'static [UserRole],
    req: Request,
    next: Next,
) -> AuthResult<Response> {
    context_of(&req)?.ensure_role(allowed)?;
    Ok(next.run(req).await)
}

pub async fn require_admin(req: Request, next: Next) -> AuthResult<Response> {
    require_roles(&[UserRole::Admin], req, next).await
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .ok_or(AuthError::MissingToken)?
            .require()
            .cloned()
    }
}

/// Public routes that personalise their answer for a signed-in caller
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .and_then(AuthContext::user)
            .cloned())
    }
}
