//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::i18n::{Language, LocalizedText};
use kernel::id::UserId;
use kernel::pagination::PageQuery;
use kernel::validation::{Validate, Validator};
use platform::password::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use serde::{Deserialize, Serialize};

use crate::application::{
    ChangePasswordInput, LoginInput, OAuthInput, ProfileChanges, ProviderProfileChanges, Session,
    StatusChange, UserWithProfile,
};
use crate::domain::entity::{provider_profile::ProviderProfile, user::User};
use crate::domain::value_object::user_role::UserRole;

const NAME_MESSAGE: &str = "must be between 1 and 50 characters";
const PASSWORD_MESSAGE: &str = "Password must be between 8 and 128 characters";

fn check_password(v: &mut Validator, field: &str, value: &str) {
    let len = value.chars().count();
    v.check(
        (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len),
        field,
        PASSWORD_MESSAGE,
        serde_json::Value::Null,
    );
}

fn check_language(v: &mut Validator, value: Option<&str>) {
    if let Some(code) = value {
        v.check(
            Language::from_code(code).is_some(),
            "language",
            "Language must be one of en, fr, ar",
            code,
        );
    }
}

fn check_phone(v: &mut Validator, value: Option<&str>) {
    if let Some(phone) = value.map(str::trim).filter(|p| !p.is_empty()) {
        let ok = phone.len() <= 20
            && phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
        v.check(ok, "phone", "Please provide a valid phone number", phone);
    }
}

fn parse_language(value: Option<&str>) -> Option<Language> {
    value.and_then(Language::from_code)
}

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// `CUSTOMER` (default) or `PROVIDER`
    pub role: Option<String>,
    pub phone: Option<String>,
    pub language: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self, v: &mut Validator) {
        v.email("email", &self.email);
        check_password(v, "password", &self.password);
        v.length("firstName", &self.first_name, 1, 50, &format!("First name {NAME_MESSAGE}"));
        v.length("lastName", &self.last_name, 1, 50, &format!("Last name {NAME_MESSAGE}"));
        if let Some(role) = &self.role {
            let ok = UserRole::from_code(role).is_some_and(|r| r.is_self_assignable());
            v.check(ok, "role", "Role must be CUSTOMER or PROVIDER", role);
        }
        check_phone(v, self.phone.as_deref());
        check_language(v, self.language.as_deref());
    }
}

impl RegisterRequest {
    pub fn role(&self) -> UserRole {
        self.role
            .as_deref()
            .and_then(UserRole::from_code)
            .unwrap_or_default()
    }

    pub fn language(&self) -> Option<Language> {
        parse_language(self.language.as_deref())
    }
}

// ============================================================================
// Login / OAuth
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self, v: &mut Validator) {
        v.email("email", &self.email);
        v.required("password", Some(&self.password), "Password is required");
    }
}

impl From<LoginRequest> for LoginInput {
    fn from(req: LoginRequest) -> Self {
        LoginInput {
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OAuthRequest {
    /// e.g. `google`, `facebook`
    pub provider: String,
    pub provider_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
}

impl Validate for OAuthRequest {
    fn validate(&self, v: &mut Validator) {
        v.length("provider", &self.provider, 1, 50, "Provider is required");
        v.length("providerId", &self.provider_id, 1, 255, "Provider id is required");
        v.email("email", &self.email);
        v.length("firstName", &self.first_name, 1, 50, &format!("First name {NAME_MESSAGE}"));
        v.length("lastName", &self.last_name, 1, 50, &format!("Last name {NAME_MESSAGE}"));
    }
}

impl From<OAuthRequest> for OAuthInput {
    fn from(req: OAuthRequest) -> Self {
        OAuthInput {
            provider: req.provider.trim().to_lowercase(),
            provider_id: req.provider_id.trim().to_string(),
            email: req.email,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            avatar: req.avatar,
        }
    }
}

// ============================================================================
// Change Password
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: String,
}

impl Validate for ChangePasswordRequest {
    fn validate(&self, v: &mut Validator) {
        check_password(v, "newPassword", &self.new_password);
    }
}

impl From<ChangePasswordRequest> for ChangePasswordInput {
    fn from(req: ChangePasswordRequest) -> Self {
        ChangePasswordInput {
            current_password: req.current_password,
            new_password: req.new_password,
        }
    }
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub language: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self, v: &mut Validator) {
        v.optional_length(
            "firstName",
            self.first_name.as_deref(),
            1,
            50,
            &format!("First name {NAME_MESSAGE}"),
        );
        v.optional_length(
            "lastName",
            self.last_name.as_deref(),
            1,
            50,
            &format!("Last name {NAME_MESSAGE}"),
        );
        check_phone(v, self.phone.as_deref());
        v.optional_length("avatar", self.avatar.as_deref(), 0, 500, "Avatar URL is too long");
        check_language(v, self.language.as_deref());
    }
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        ProfileChanges {
            language: parse_language(req.language.as_deref()),
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            avatar: req.avatar,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProviderProfileRequest {
    pub business_name: Option<String>,
    pub description: Option<LocalizedText>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub experience_years: Option<i32>,
    pub service_radius_km: Option<i32>,
}

impl Validate for UpdateProviderProfileRequest {
    fn validate(&self, v: &mut Validator) {
        v.optional_length(
            "businessName",
            self.business_name.as_deref(),
            0,
            100,
            "Business name cannot exceed 100 characters",
        );
        if let Some(description) = &self.description {
            v.check(
                description.max_chars() <= 2000,
                "description",
                "Description cannot exceed 2000 characters",
                serde_json::Value::Null,
            );
        }
        v.optional_length("address", self.address.as_deref(), 0, 255, "Address is too long");
        v.optional_length("city", self.city.as_deref(), 0, 100, "City is too long");
        v.optional_length("website", self.website.as_deref(), 0, 255, "Website is too long");
        if let Some(years) = self.experience_years {
            v.range("experienceYears", years, 0, 80, "Experience must be between 0 and 80 years");
        }
        if let Some(radius) = self.service_radius_km {
            v.range(
                "serviceRadiusKm",
                radius,
                0,
                1000,
                "Service radius must be between 0 and 1000 km",
            );
        }
    }
}

impl From<UpdateProviderProfileRequest> for ProviderProfileChanges {
    fn from(req: UpdateProviderProfileRequest) -> Self {
        ProviderProfileChanges {
            business_name: req.business_name,
            description: req.description,
            address: req.address,
            city: req.city,
            website: req.website,
            experience_years: req.experience_years,
            service_radius_km: req.service_radius_km,
        }
    }
}

// ============================================================================
// Directory / Admin
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderListQuery {
    pub city: Option<String>,
    pub search: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStatusRequest {
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

impl Validate for UpdateStatusRequest {
    fn validate(&self, v: &mut Validator) {
        v.check(
            self.is_active.is_some() || self.is_verified.is_some(),
            "isActive",
            "Provide isActive or isVerified",
            serde_json::Value::Null,
        );
    }
}

impl From<UpdateStatusRequest> for StatusChange {
    fn from(req: UpdateStatusRequest) -> Self {
        StatusChange {
            is_active: req.is_active,
            is_verified: req.is_verified,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfileResponse {
    pub business_name: Option<String>,
    pub description: LocalizedText,
    pub address: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub experience_years: Option<i32>,
    pub service_radius_km: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProviderProfile> for ProviderProfileResponse {
    fn from(p: ProviderProfile) -> Self {
        Self {
            business_name: p.business_name,
            description: p.description,
            address: p.address,
            city: p.city,
            website: p.website,
            experience_years: p.experience_years,
            service_radius_km: p.service_radius_km,
            updated_at: p.updated_at,
        }
    }
}

/// User as returned to clients; never carries the password hash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
    pub is_active: bool,
    pub language: Language,
    pub has_password: bool,
    pub oauth_provider: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_profile: Option<ProviderProfileResponse>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            has_password: user.password.is_some(),
            email: user.email.into_db(),
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            avatar: user.avatar,
            role: user.role,
            is_verified: user.is_verified,
            is_active: user.is_active,
            language: user.language,
            oauth_provider: user.oauth_provider,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            provider_profile: None,
        }
    }
}

impl From<UserWithProfile> for UserResponse {
    fn from(value: UserWithProfile) -> Self {
        let mut response = UserResponse::from(value.user);
        response.provider_profile = value.profile.map(ProviderProfileResponse::from);
        response
    }
}

/// `{token, user}` returned by register, login, refresh and OAuth
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.user.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::validation::validate;

    fn register() -> RegisterRequest {
        RegisterRequest {
            email: "amina@example.com".into(),
            password: "s3cure-pass".into(),
            first_name: "Amina".into(),
            last_name: "Benali".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_register_request_valid() {
        assert!(validate(&register()).is_ok());
        assert_eq!(register().role(), UserRole::Customer);
    }

    #[test]
    fn test_register_request_collects_all_errors() {
        let req = RegisterRequest {
            email: "nope".into(),
            password: "short".into(),
            first_name: "".into(),
            ..register()
        };
        let err = validate(&req).unwrap_err();
        let fields: Vec<_> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password", "firstName"]);
        assert_eq!(err.message(), "Validation failed");
    }

    #[test]
    fn test_register_request_rejects_admin_role() {
        let req = RegisterRequest {
            role: Some("ADMIN".into()),
            ..register()
        };
        let err = validate(&req).unwrap_err();
        assert_eq!(err.errors()[0].field, "role");
    }

    #[test]
    fn test_register_request_provider_role() {
        let req = RegisterRequest {
            role: Some("provider".into()),
            language: Some("ar".into()),
            ..register()
        };
        assert!(validate(&req).is_ok());
        assert_eq!(req.role(), UserRole::Provider);
        assert_eq!(req.language(), Some(Language::Ar));
    }

    #[test]
    fn test_missing_body_fields_become_validation_errors() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        let err = validate(&req).unwrap_err();
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn test_status_request_needs_a_field() {
        assert!(validate(&UpdateStatusRequest::default()).is_err());
        let req = UpdateStatusRequest {
            is_active: Some(false),
            is_verified: None,
        };
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_user_response_hides_password() {
        use crate::domain::value_object::email::Email;

        let user = User::new(
            Email::new("a@b.co").unwrap(),
            None,
            "A".into(),
            "B".into(),
            UserRole::Provider,
        );
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["role"], "PROVIDER");
        assert_eq!(json["hasPassword"], false);
        assert!(json.get("password").is_none());
        assert!(json.get("providerProfile").is_none());
    }
}
