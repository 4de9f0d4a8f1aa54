//! User Entity

use chrono::{DateTime, Utc};
use kernel::i18n::Language;
use kernel::id::UserId;

use crate::domain::value_object::{
    email::Email, user_password::UserPassword, user_role::UserRole,
};

/// Registered account (customer, provider or admin)
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    /// Unique, lower-cased
    pub email: Email,
    /// `None` for accounts created through OAuth that never set a password
    pub password: Option<UserPassword>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
    pub is_active: bool,
    pub language: Language,
    pub oauth_provider: Option<String>,
    pub oauth_subject: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New active, unverified account
    pub fn new(
        email: Email,
        password: Option<UserPassword>,
        first_name: String,
        last_name: String,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email,
            password,
            first_name,
            last_name,
            phone: None,
            avatar: None,
            role,
            is_verified: false,
            is_active: true,
            language: Language::default(),
            oauth_provider: None,
            oauth_subject: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn is_provider(&self) -> bool {
        self.role == UserRole::Provider
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn set_password(&mut self, password: UserPassword) {
        self.password = Some(password);
        self.updated_at = Utc::now();
    }

    /// Attach an external identity; the provider has verified the address.
    pub fn link_oauth(&mut self, provider: &str, subject: &str) {
        self.oauth_provider = Some(provider.to_string());
        self.oauth_subject = Some(subject.to_string());
        self.is_verified = true;
        self.updated_at = Utc::now();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            Email::new("nadia@example.com").unwrap(),
            None,
            "Nadia".into(),
            "Benali".into(),
            UserRole::Provider,
        )
    }

    #[test]
    fn test_new_user_defaults() {
        let u = user();
        assert!(u.is_active);
        assert!(!u.is_verified);
        assert_eq!(u.language, Language::En);
        assert!(u.is_provider());
        assert_eq!(u.full_name(), "Nadia Benali");
    }

    #[test]
    fn test_link_oauth_verifies() {
        let mut u = user();
        u.link_oauth("google", "1234");
        assert!(u.is_verified);
        assert_eq!(u.oauth_subject.as_deref(), Some("1234"));
    }

    #[test]
    fn test_record_login() {
        let mut u = user();
        assert!(u.last_login_at.is_none());
        u.record_login();
        assert!(u.last_login_at.is_some());
    }
}
