//! Service listing

use chrono::{DateTime, Utc};
use kernel::i18n::LocalizedText;
use kernel::id::{CategoryId, ServiceId, SubcategoryId, UserId};
use rust_decimal::Decimal;

use crate::domain::value_object::price_type::PriceType;
use crate::domain::value_object::rating::RatingSummary;

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: ServiceId,
    pub provider_id: UserId,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    pub title: LocalizedText,
    pub description: LocalizedText,
    /// Non-negative, two decimals
    pub price: Decimal,
    pub price_type: PriceType,
    pub duration_minutes: Option<i32>,
    pub service_area: Option<String>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_available: bool,
    /// Derived from approved reviews
    pub rating: RatingSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a provider supplies when listing a service
#[derive(Debug, Clone)]
pub struct NewService {
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub price: Decimal,
    pub price_type: PriceType,
    pub duration_minutes: Option<i32>,
    pub service_area: Option<String>,
    pub images: Vec<String>,
}

impl Service {
    pub fn new(provider_id: UserId, input: NewService) -> Self {
        let now = Utc::now();
        Self {
            id: ServiceId::new(),
            provider_id,
            category_id: input.category_id,
            subcategory_id: input.subcategory_id,
            title: input.title.normalized(),
            description: input.description.normalized(),
            price: input.price.round_dp(2),
            price_type: input.price_type,
            duration_minutes: input.duration_minutes,
            service_area: input.service_area,
            images: input.images,
            is_active: true,
            is_available: true,
            rating: RatingSummary::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.provider_id == user_id
    }

    /// Active, accepting bookings
    pub fn is_bookable(&self) -> bool {
        self.is_active && self.is_available
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}
