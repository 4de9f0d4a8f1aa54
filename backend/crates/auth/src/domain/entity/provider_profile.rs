//! Provider Profile Entity

use chrono::{DateTime, Utc};
use kernel::i18n::LocalizedText;
use kernel::id::UserId;

/// Business details of a PROVIDER account (one per provider)
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderProfile {
    pub user_id: UserId,
    pub business_name: Option<String>,
    pub description: LocalizedText,
    pub address: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub experience_years: Option<i32>,
    pub service_radius_km: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderProfile {
    /// Blank profile created alongside a provider registration
    pub fn empty(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            business_name: None,
            description: LocalizedText::default(),
            address: None,
            city: None,
            website: None,
            experience_years: None,
            service_radius_km: None,
            created_at: now,
            updated_at: now,
        }
    }
}
