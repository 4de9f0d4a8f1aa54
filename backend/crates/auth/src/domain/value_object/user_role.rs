use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role, stored as SMALLINT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    Customer = 0,
    Provider = 1,
    Admin = 2,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            Customer => "CUSTOMER",
            Provider => "PROVIDER",
            Admin => "ADMIN",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Roles a visitor may pick at registration
    #[inline]
    pub const fn is_self_assignable(&self) -> bool {
        matches!(self, UserRole::Customer | UserRole::Provider)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use UserRole::*;
        match id {
            0 => Some(Customer),
            1 => Some(Provider),
            2 => Some(Admin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code.trim().to_ascii_uppercase().as_str() {
            "CUSTOMER" => Some(Customer),
            "PROVIDER" => Some(Provider),
            "ADMIN" => Some(Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_from_id() {
        assert_eq!(UserRole::from_id(0), Some(UserRole::Customer));
        assert_eq!(UserRole::from_id(1), Some(UserRole::Provider));
        assert_eq!(UserRole::from_id(2), Some(UserRole::Admin));
        assert_eq!(UserRole::from_id(9), None);
    }

    #[test]
    fn test_user_role_from_code() {
        assert_eq!(UserRole::from_code("customer"), Some(UserRole::Customer));
        assert_eq!(UserRole::from_code("PROVIDER"), Some(UserRole::Provider));
        assert_eq!(UserRole::from_code("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_code("root"), None);
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(
            serde_json::to_string(&UserRole::Provider).unwrap(),
            "\"PROVIDER\""
        );
        let role: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn test_self_assignable() {
        assert!(UserRole::Customer.is_self_assignable());
        assert!(UserRole::Provider.is_self_assignable());
        assert!(!UserRole::Admin.is_self_assignable());
    }
}
