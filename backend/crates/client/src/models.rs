//! Wire types
//!
//! Mirrors the JSON the API renders. Everything is camelCase; optional and
//! collection fields default so older servers still deserialize.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(default)]
    pub value: Value,
}

/// One page of a listing
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// `?page=&limit=`; unset values use the server defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Count {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Updated {
    pub updated: u64,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Provider,
    Admin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar: Option<String>,
}

impl LocalizedText {
    pub fn english(text: impl Into<String>) -> Self {
        Self {
            en: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub business_name: Option<String>,
    #[serde(default)]
    pub description: LocalizedText,
    pub address: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub experience_years: Option<i32>,
    pub service_radius_km: Option<i32>,
}

/// The signed-in user as `/auth/me` returns it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_profile: Option<ProviderProfile>,
}

fn active() -> bool {
    true
}

/// Another user embedded in a service, booking, review or message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Token plus user; what auth endpoints return and what the token store keeps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Relayed after an OAuth provider flow
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthRequest {
    pub provider: String,
    pub provider_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    pub new_password: String,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceType {
    Fixed,
    Hourly,
    Daily,
    Negotiable,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: Uuid,
    pub slug: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub slug: String,
    pub name: LocalizedText,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBrief {
    pub id: Uuid,
    pub title: LocalizedText,
    pub price: f64,
    pub price_type: PriceType,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category_id: Uuid,
    #[serde(default)]
    pub subcategory_id: Option<Uuid>,
    pub title: LocalizedText,
    pub description: LocalizedText,
    #[serde(default)]
    pub localized_title: String,
    #[serde(default)]
    pub localized_description: String,
    pub price: f64,
    pub price_type: PriceType,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub service_area: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_available: bool,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub provider: Option<UserSummary>,
    #[serde(default)]
    pub category: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: Service,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Listing filters for `GET /services`
#[derive(Debug, Clone, Default)]
pub struct ServiceQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub provider_id: Option<Uuid>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub available: Option<bool>,
    /// `newest`, `price_asc`, `price_desc` or `rating`
    pub sort: Option<String>,
    pub lang: Option<String>,
    pub page: PageParams,
}

impl ServiceQuery {
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.page.pairs();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key, value));
            }
        };
        push("category", self.category.clone());
        push("subcategory", self.subcategory.clone());
        push("providerId", self.provider_id.map(|id| id.to_string()));
        push("minPrice", self.min_price.map(|p| p.to_string()));
        push("maxPrice", self.max_price.map(|p| p.to_string()));
        push("search", self.search.clone());
        push("available", self.available.map(|a| a.to_string()));
        push("sort", self.sort.clone());
        push("lang", self.lang.clone());
        pairs
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub category_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<Uuid>,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub price: f64,
    pub price_type: PriceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_area: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

/// Partial update; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_type: Option<PriceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Rejected,
}

impl BookingStatus {
    pub fn code(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Uuid,
    pub scheduled_date: NaiveDate,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub total_price: f64,
    pub status: BookingStatus,
    #[serde(default)]
    pub provider_notes: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub cancelled_by: Option<Uuid>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub service: Option<ServiceBrief>,
    #[serde(default)]
    pub customer: Option<UserSummary>,
    #[serde(default)]
    pub provider: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub service_id: Uuid,
    pub scheduled_date: NaiveDate,
    /// `HH:MM`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub service_id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub rating: i16,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub provider_response: Option<String>,
    #[serde(default)]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(default = "active")]
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub customer: Option<UserSummary>,
    #[serde(default)]
    pub service: Option<ServiceBrief>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: i64,
}

// ============================================================================
// Messages and notifications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    #[serde(default)]
    pub booking_id: Option<Uuid>,
    pub content: String,
    pub is_read: bool,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sender: Option<UserSummary>,
    #[serde(default)]
    pub receiver: Option<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(default)]
    pub partner: Option<UserSummary>,
    pub last_message: Message,
    pub unread_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub receiver_id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    /// e.g. `BOOKING_CREATED`, `NEW_MESSAGE`
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_envelope() {
        let env: Envelope<Value> = serde_json::from_value(json!({
            "success": false,
            "message": "Validation failed",
            "errors": [{ "field": "email", "message": "Invalid email", "value": "x" }]
        }))
        .unwrap();
        assert!(!env.success);
        assert!(env.data.is_none());
        assert_eq!(env.errors[0].field, "email");
    }

    #[test]
    fn test_service_query_pairs() {
        let query = ServiceQuery {
            category: Some("plumbing".into()),
            max_price: Some(100.0),
            available: Some(true),
            page: PageParams::new(2, 5),
            ..ServiceQuery::default()
        };
        assert_eq!(
            query.pairs(),
            vec![
                ("page", "2".to_string()),
                ("limit", "5".to_string()),
                ("category", "plumbing".to_string()),
                ("maxPrice", "100".to_string()),
                ("available", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_notification_type_field() {
        let n: Notification = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "type": "NEW_REVIEW",
            "title": "New review",
            "body": "5 stars",
            "data": { "reviewId": Uuid::nil() },
            "isRead": false,
            "createdAt": "2025-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(n.kind, "NEW_REVIEW");
    }
}
