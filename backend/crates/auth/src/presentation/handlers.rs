//! HTTP Handlers

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use kernel::envelope::ApiResponse;
use kernel::id::UserId;
use kernel::validation::{Valid, ValidPath};
use platform::client::extract_bearer_token;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    AuthUser, ChangePasswordUseCase, DirectoryUseCase, LoginUseCase, OAuthUseCase,
    ProfileUseCase, RefreshUseCase, RegisterInput, RegisterUseCase,
};
use crate::domain::repository::{AuthStore, ProviderFilter, UserFilter};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, OAuthRequest, ProviderListQuery,
    RegisterRequest, UpdateProfileRequest, UpdateProviderProfileRequest, UpdateStatusRequest,
    UserListQuery, UserResponse,
};

/// Header carrying the frontend's OAuth shared secret
pub const OAUTH_SECRET_HEADER: &str = "x-oauth-secret";

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AuthStore,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Register / Login
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Valid(req): Valid<RegisterRequest>,
) -> AuthResult<ApiResponse<AuthResponse>>
where
    R: AuthStore,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let input = RegisterInput {
        role: req.role(),
        language: req.language(),
        email: req.email,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
        phone: req.phone,
    };

    let session = use_case.execute(input).await?;

    Ok(ApiResponse::created(AuthResponse::from(session))
        .with_message("User registered successfully"))
}

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Valid(req): Valid<LoginRequest>,
) -> AuthResult<ApiResponse<AuthResponse>>
where
    R: AuthStore,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.config.clone());
    let session = use_case.execute(req.into()).await?;

    Ok(ApiResponse::ok(AuthResponse::from(session)).with_message("Login successful"))
}

/// POST /api/auth/refresh
///
/// Reads the header itself: an expired token is exactly what this route accepts.
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<ApiResponse<AuthResponse>>
where
    R: AuthStore,
{
    let token = extract_bearer_token(&headers).ok_or(AuthError::MissingToken)?;

    let use_case = RefreshUseCase::new(state.repo.clone(), state.config.clone());
    let session = use_case.execute(token).await?;

    Ok(ApiResponse::ok(AuthResponse::from(session)))
}

/// POST /api/auth/oauth
pub async fn oauth<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Valid(req): Valid<OAuthRequest>,
) -> AuthResult<ApiResponse<AuthResponse>>
where
    R: AuthStore,
{
    let secret = headers
        .get(OAUTH_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    let use_case = OAuthUseCase::new(state.repo.clone(), state.config.clone());
    let session = use_case.execute(secret, req.into()).await?;

    Ok(ApiResponse::ok(AuthResponse::from(session)))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/auth/me, GET /api/users/profile
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    user: AuthUser,
) -> AuthResult<ApiResponse<UserResponse>>
where
    R: AuthStore,
{
    let use_case = ProfileUseCase::new(state.repo.clone());
    let current = use_case.get(&user.id).await?;

    Ok(ApiResponse::ok(current.into()))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout(user: AuthUser) -> ApiResponse<()> {
    tracing::info!(user_id = %user.id, "User logged out");
    ApiResponse::message("Logged out successfully")
}

/// PUT /api/auth/change-password
pub async fn change_password<R>(
    State(state): State<AuthAppState<R>>,
    user: AuthUser,
    Valid(req): Valid<ChangePasswordRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: AuthStore,
{
    let use_case = ChangePasswordUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute(&user.id, req.into()).await?;

    Ok(ApiResponse::message("Password updated successfully"))
}

// ============================================================================
// Profiles
// ============================================================================

/// PUT /api/users/profile
pub async fn update_profile<R>(
    State(state): State<AuthAppState<R>>,
    user: AuthUser,
    Valid(req): Valid<UpdateProfileRequest>,
) -> AuthResult<ApiResponse<UserResponse>>
where
    R: AuthStore,
{
    let use_case = ProfileUseCase::new(state.repo.clone());
    let updated = use_case.update(&user.id, req.into()).await?;

    Ok(ApiResponse::ok(updated.into()).with_message("Profile updated successfully"))
}

/// PUT /api/users/provider-profile
pub async fn update_provider_profile<R>(
    State(state): State<AuthAppState<R>>,
    user: AuthUser,
    Valid(req): Valid<UpdateProviderProfileRequest>,
) -> AuthResult<ApiResponse<UserResponse>>
where
    R: AuthStore,
{
    user.ensure_role(&[UserRole::Provider])?;

    let use_case = ProfileUseCase::new(state.repo.clone());
    let updated = use_case.update_provider_profile(&user.id, req.into()).await?;

    Ok(ApiResponse::ok(updated.into()).with_message("Provider profile updated successfully"))
}

// ============================================================================
// Directory
// ============================================================================

/// GET /api/users/providers
pub async fn list_providers<R>(
    State(state): State<AuthAppState<R>>,
    Query(query): Query<ProviderListQuery>,
) -> AuthResult<ApiResponse<Vec<UserResponse>>>
where
    R: AuthStore,
{
    let filter = ProviderFilter {
        city: query.city,
        search: query.search,
    };

    let use_case = DirectoryUseCase::new(state.repo.clone());
    let page = use_case
        .list_providers(&filter, query.page.to_request())
        .await?;

    Ok(ApiResponse::page(page.map(UserResponse::from)))
}

/// GET /api/users/providers/{id}
pub async fn get_provider<R>(
    State(state): State<AuthAppState<R>>,
    ValidPath(id): ValidPath<UserId>,
) -> AuthResult<ApiResponse<UserResponse>>
where
    R: AuthStore,
{
    let use_case = DirectoryUseCase::new(state.repo.clone());
    let provider = use_case.get_provider(&id).await?;

    Ok(ApiResponse::ok(provider.into()))
}

/// GET /api/users (admin)
pub async fn list_users<R>(
    State(state): State<AuthAppState<R>>,
    Query(query): Query<UserListQuery>,
) -> AuthResult<ApiResponse<Vec<UserResponse>>>
where
    R: AuthStore,
{
    let role = match query.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(code) => Some(UserRole::from_code(code).ok_or_else(|| {
            AuthError::invalid_field("role", "Unknown role", serde_json::json!(code))
        })?),
        None => None,
    };
    let filter = UserFilter {
        role,
        search: query.search,
    };

    let use_case = DirectoryUseCase::new(state.repo.clone());
    let page = use_case.list_users(&filter, query.page.to_request()).await?;

    Ok(ApiResponse::page(page.map(UserResponse::from)))
}

/// PATCH /api/users/{id}/status (admin)
pub async fn update_status<R>(
    State(state): State<AuthAppState<R>>,
    admin: AuthUser,
    ValidPath(id): ValidPath<UserId>,
    Valid(req): Valid<UpdateStatusRequest>,
) -> AuthResult<ApiResponse<UserResponse>>
where
    R: AuthStore,
{
    let use_case = DirectoryUseCase::new(state.repo.clone());
    let user = use_case.set_status(&admin.id, &id, req.into()).await?;

    Ok(ApiResponse::ok(user.into()).with_message("User status updated"))
}
