//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kernel::i18n::{Language, LocalizedText};
use kernel::id::{
    BookingId, CategoryId, MessageId, NotificationId, ReviewId, ServiceId, SubcategoryId, UserId,
};
use kernel::pagination::PageQuery;
use kernel::validation::{Validate, Validator};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::application::{
    BookingView, CategoryInput, ConversationView, MessageView, OutgoingMessage, ReviewView,
    ServiceChanges, ServiceDetail, ServiceView,
};
use crate::domain::entity::booking::NewBooking;
use crate::domain::entity::category::{Category, CategoryRef, Subcategory, is_valid_slug};
use crate::domain::entity::message::{MAX_MESSAGE_CHARS, Message};
use crate::domain::entity::notification::Notification;
use crate::domain::entity::service::{NewService, Service};
use crate::domain::entity::user_summary::UserSummary;
use crate::domain::repository::{ServiceFilter, ServiceSort};
use crate::domain::value_object::{
    booking_status::BookingStatus, notification_kind::NotificationKind, price_type::PriceType,
    rating::{MAX_RATING, MIN_RATING},
};
use crate::error::{MarketError, MarketResult};

const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 5000;
const COMMENT_MAX: usize = 1000;
const MAX_IMAGES: usize = 10;
/// 1 week
const MAX_DURATION_MINUTES: i32 = 10_080;

fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

fn check_text(v: &mut Validator, field: &str, value: &LocalizedText, max: usize, label: &str) {
    if v.check(!value.is_empty(), field, format!("{label} is required"), value) {
        v.check(
            value.max_chars() <= max,
            field,
            format!("{label} must be at most {max} characters"),
            Value::Null,
        );
    }
}

fn check_price(v: &mut Validator, price: Option<Decimal>, required: bool) {
    match price {
        Some(p) => {
            v.check(
                p >= Decimal::ZERO && p <= max_price(),
                "price",
                "Price must be a non-negative amount",
                p.to_string(),
            );
        }
        None if required => v.push("price", "Price is required", Value::Null),
        None => {}
    }
}

fn check_price_type(v: &mut Validator, value: Option<&str>) {
    if let Some(code) = value {
        v.check(
            PriceType::from_code(code).is_some(),
            "priceType",
            "Price type must be one of FIXED, HOURLY, DAILY, NEGOTIABLE",
            code,
        );
    }
}

fn check_duration(v: &mut Validator, value: Option<i32>) {
    if let Some(minutes) = value {
        v.range(
            "durationMinutes",
            minutes,
            1,
            MAX_DURATION_MINUTES,
            "Duration must be between 1 and 10080 minutes",
        );
    }
}

fn check_images(v: &mut Validator, images: Option<&[String]>) {
    if let Some(images) = images {
        v.check(
            images.len() <= MAX_IMAGES,
            "images",
            format!("At most {MAX_IMAGES} images are allowed"),
            images.len(),
        );
        v.check(
            images.iter().all(|i| !i.trim().is_empty() && i.len() <= 500),
            "images",
            "Image URLs must be non-empty and at most 500 characters",
            Value::Null,
        );
    }
}

fn check_rating(v: &mut Validator, rating: Option<i16>, required: bool) {
    match rating {
        Some(r) => {
            v.range("rating", r, MIN_RATING, MAX_RATING, "Rating must be between 1 and 5");
        }
        None if required => v.push("rating", "Rating is required", Value::Null),
        None => {}
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
}

/// `HH:MM` or `HH:MM:SS`
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn missing(field: &str, message: &str) -> MarketError {
    MarketError::invalid_field(field, message, Value::Null)
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCategoryRequest {
    pub slug: String,
    pub name: LocalizedText,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
}

impl Validate for CreateCategoryRequest {
    fn validate(&self, v: &mut Validator) {
        v.check(
            is_valid_slug(self.slug.trim()),
            "slug",
            "Slug may only contain lowercase letters, digits and dashes",
            &self.slug,
        );
        check_text(v, "name", &self.name, 100, "Name");
        v.optional_length(
            "icon",
            self.icon.as_deref(),
            1,
            100,
            "Icon must be at most 100 characters",
        );
    }
}

impl From<CreateCategoryRequest> for CategoryInput {
    fn from(req: CreateCategoryRequest) -> Self {
        CategoryInput {
            slug: req.slug,
            name: req.name,
            icon: trimmed(req.icon),
            sort_order: req.sort_order.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryResponse {
    pub id: SubcategoryId,
    pub slug: String,
    pub name: LocalizedText,
    pub sort_order: i32,
}

impl From<Subcategory> for SubcategoryResponse {
    fn from(s: Subcategory) -> Self {
        Self {
            id: s.id,
            slug: s.slug,
            name: s.name,
            sort_order: s.sort_order,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub slug: String,
    pub name: LocalizedText,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub subcategories: Vec<SubcategoryResponse>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            slug: c.slug,
            name: c.name,
            icon: c.icon,
            sort_order: c.sort_order,
            subcategories: c.subcategories.into_iter().map(Into::into).collect(),
        }
    }
}

/// Category as embedded in a service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBrief {
    pub id: CategoryId,
    pub slug: String,
    pub name: LocalizedText,
    pub icon: Option<String>,
}

impl From<Category> for CategoryBrief {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            slug: c.slug,
            name: c.name,
            icon: c.icon,
        }
    }
}

// ============================================================================
// Services
// ============================================================================

/// Query of `GET /api/services`; unparsable filters are ignored
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceListQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    /// Category id or slug
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub provider_id: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub search: Option<String>,
    pub available: Option<String>,
    pub sort: Option<String>,
    pub lang: Option<String>,
}

impl ServiceListQuery {
    pub fn category(&self) -> Option<CategoryRef> {
        self.category.as_deref().and_then(CategoryRef::parse)
    }

    pub fn language(&self) -> Language {
        language(self.lang.as_deref())
    }

    pub fn filter(&self) -> ServiceFilter {
        fn price(raw: Option<&str>) -> Option<Decimal> {
            raw.and_then(|s| s.trim().parse::<Decimal>().ok())
                .filter(|p| *p >= Decimal::ZERO)
        }

        ServiceFilter {
            subcategory_id: self.subcategory.as_deref().and_then(|s| s.trim().parse().ok()),
            provider_id: self.provider_id.as_deref().and_then(|s| s.trim().parse().ok()),
            min_price: price(self.min_price.as_deref()),
            max_price: price(self.max_price.as_deref()),
            search: trimmed(self.search.clone()),
            available: parse_flag(self.available.as_deref()),
            sort: self
                .sort
                .as_deref()
                .and_then(ServiceSort::parse)
                .unwrap_or_default(),
            ..ServiceFilter::default()
        }
    }
}

/// `?lang=` on single-resource reads
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LangQuery {
    pub lang: Option<String>,
}

impl LangQuery {
    pub fn language(&self) -> Language {
        language(self.lang.as_deref())
    }
}

fn language(raw: Option<&str>) -> Language {
    raw.and_then(Language::from_code).unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateServiceRequest {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub price: Option<Decimal>,
    /// Defaults to `FIXED`
    pub price_type: Option<String>,
    pub duration_minutes: Option<i32>,
    pub service_area: Option<String>,
    pub images: Vec<String>,
}

impl Validate for CreateServiceRequest {
    fn validate(&self, v: &mut Validator) {
        v.check(
            self.category_id.is_some(),
            "categoryId",
            "Category is required",
            Value::Null,
        );
        check_text(v, "title", &self.title, TITLE_MAX, "Title");
        check_text(v, "description", &self.description, DESCRIPTION_MAX, "Description");
        check_price(v, self.price, true);
        check_price_type(v, self.price_type.as_deref());
        check_duration(v, self.duration_minutes);
        v.optional_length(
            "serviceArea",
            self.service_area.as_deref(),
            0,
            200,
            "Service area must be at most 200 characters",
        );
        check_images(v, Some(&self.images));
    }
}

impl CreateServiceRequest {
    pub fn into_new_service(self) -> MarketResult<NewService> {
        Ok(NewService {
            category_id: self
                .category_id
                .ok_or_else(|| missing("categoryId", "Category is required"))?,
            subcategory_id: self.subcategory_id,
            title: self.title,
            description: self.description,
            price: self
                .price
                .ok_or_else(|| missing("price", "Price is required"))?,
            price_type: self
                .price_type
                .as_deref()
                .and_then(PriceType::from_code)
                .unwrap_or_default(),
            duration_minutes: self.duration_minutes,
            service_area: trimmed(self.service_area),
            images: self.images.into_iter().map(|i| i.trim().to_string()).collect(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateServiceRequest {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub title: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub price: Option<Decimal>,
    pub price_type: Option<String>,
    pub duration_minutes: Option<i32>,
    pub service_area: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_available: Option<bool>,
}

impl Validate for UpdateServiceRequest {
    fn validate(&self, v: &mut Validator) {
        if let Some(title) = &self.title {
            check_text(v, "title", title, TITLE_MAX, "Title");
        }
        if let Some(description) = &self.description {
            check_text(v, "description", description, DESCRIPTION_MAX, "Description");
        }
        check_price(v, self.price, false);
        check_price_type(v, self.price_type.as_deref());
        check_duration(v, self.duration_minutes);
        v.optional_length(
            "serviceArea",
            self.service_area.as_deref(),
            0,
            200,
            "Service area must be at most 200 characters",
        );
        check_images(v, self.images.as_deref());
    }
}

impl From<UpdateServiceRequest> for ServiceChanges {
    fn from(req: UpdateServiceRequest) -> Self {
        ServiceChanges {
            category_id: req.category_id,
            subcategory_id: req.subcategory_id,
            title: req.title,
            description: req.description,
            price: req.price,
            price_type: req.price_type.as_deref().and_then(PriceType::from_code),
            duration_minutes: req.duration_minutes,
            service_area: req.service_area,
            images: req
                .images
                .map(|images| images.into_iter().map(|i| i.trim().to_string()).collect()),
            is_active: req.is_active,
            is_available: req.is_available,
        }
    }
}

/// Service fields embedded in bookings and reviews
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBrief {
    pub id: ServiceId,
    pub title: LocalizedText,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub price_type: PriceType,
    pub images: Vec<String>,
}

impl From<Service> for ServiceBrief {
    fn from(s: Service) -> Self {
        Self {
            id: s.id,
            title: s.title,
            price: s.price,
            price_type: s.price_type,
            images: s.images,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: ServiceId,
    pub provider_id: UserId,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    pub title: LocalizedText,
    pub description: LocalizedText,
    /// `title` resolved for the requested language
    pub localized_title: String,
    pub localized_description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub price_type: PriceType,
    pub duration_minutes: Option<i32>,
    pub service_area: Option<String>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_available: bool,
    pub average_rating: f64,
    pub total_reviews: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub provider: Option<UserSummary>,
    pub category: Option<CategoryBrief>,
}

impl ServiceResponse {
    pub fn from_view(view: ServiceView, lang: Language) -> Self {
        let s = view.service;
        Self {
            localized_title: s.title.resolve(lang).to_string(),
            localized_description: s.description.resolve(lang).to_string(),
            id: s.id,
            provider_id: s.provider_id,
            category_id: s.category_id,
            subcategory_id: s.subcategory_id,
            title: s.title,
            description: s.description,
            price: s.price,
            price_type: s.price_type,
            duration_minutes: s.duration_minutes,
            service_area: s.service_area,
            images: s.images,
            is_active: s.is_active,
            is_available: s.is_available,
            average_rating: s.rating.average_rating,
            total_reviews: s.rating.total_reviews,
            created_at: s.created_at,
            updated_at: s.updated_at,
            provider: view.provider,
            category: view.category.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetailResponse {
    #[serde(flatten)]
    pub service: ServiceResponse,
    pub reviews: Vec<ReviewResponse>,
}

impl ServiceDetailResponse {
    pub fn from_detail(detail: ServiceDetail, lang: Language) -> Self {
        Self {
            service: ServiceResponse::from_view(detail.view, lang),
            reviews: detail.reviews.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBookingRequest {
    pub service_id: Option<ServiceId>,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl Validate for CreateBookingRequest {
    fn validate(&self, v: &mut Validator) {
        v.check(
            self.service_id.is_some(),
            "serviceId",
            "Service is required",
            Value::Null,
        );
        match self.scheduled_date.as_deref() {
            Some(raw) => {
                v.check(
                    parse_date(raw).is_some(),
                    "scheduledDate",
                    "Scheduled date must be a valid date (YYYY-MM-DD)",
                    raw,
                );
            }
            None => v.push("scheduledDate", "Scheduled date is required", Value::Null),
        }
        if let Some(raw) = self.scheduled_time.as_deref().filter(|t| !t.trim().is_empty()) {
            v.check(
                parse_time(raw).is_some(),
                "scheduledTime",
                "Scheduled time must be HH:MM",
                raw,
            );
        }
        check_duration(v, self.duration_minutes);
        v.optional_length(
            "address",
            self.address.as_deref(),
            0,
            500,
            "Address must be at most 500 characters",
        );
        v.optional_length(
            "notes",
            self.notes.as_deref(),
            0,
            COMMENT_MAX,
            "Notes must be at most 1000 characters",
        );
    }
}

impl CreateBookingRequest {
    pub fn into_parts(self) -> MarketResult<(ServiceId, NewBooking)> {
        let service_id = self
            .service_id
            .ok_or_else(|| missing("serviceId", "Service is required"))?;
        let scheduled_date = self
            .scheduled_date
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| missing("scheduledDate", "Scheduled date is required"))?;

        Ok((
            service_id,
            NewBooking {
                scheduled_date,
                scheduled_time: self.scheduled_time.as_deref().and_then(parse_time),
                duration_minutes: self.duration_minutes,
                address: trimmed(self.address),
                notes: trimmed(self.notes),
            },
        ))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingListQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    pub status: Option<String>,
}

impl BookingListQuery {
    /// Unknown codes are reported as a field error
    pub fn status(&self) -> MarketResult<Option<BookingStatus>> {
        match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(code) => BookingStatus::from_code(code).map(Some).ok_or_else(|| {
                MarketError::invalid_field("status", "Unknown booking status", json!(code))
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateBookingStatusRequest {
    pub status: String,
    pub provider_notes: Option<String>,
}

impl Validate for UpdateBookingStatusRequest {
    fn validate(&self, v: &mut Validator) {
        v.check(
            BookingStatus::from_code(&self.status).is_some(),
            "status",
            "Status must be one of PENDING, CONFIRMED, IN_PROGRESS, COMPLETED, CANCELLED, REJECTED",
            &self.status,
        );
        v.optional_length(
            "providerNotes",
            self.provider_notes.as_deref(),
            0,
            COMMENT_MAX,
            "Provider notes must be at most 1000 characters",
        );
    }
}

impl UpdateBookingStatusRequest {
    pub fn into_parts(self) -> MarketResult<(BookingStatus, Option<String>)> {
        let status = BookingStatus::from_code(&self.status).ok_or_else(|| {
            MarketError::invalid_field("status", "Unknown booking status", json!(self.status))
        })?;
        Ok((status, trimmed(self.provider_notes)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

impl Validate for CancelBookingRequest {
    fn validate(&self, v: &mut Validator) {
        v.optional_length(
            "reason",
            self.reason.as_deref(),
            0,
            500,
            "Reason must be at most 500 characters",
        );
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: BookingId,
    pub customer_id: UserId,
    pub provider_id: UserId,
    pub service_id: ServiceId,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub provider_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<UserId>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub service: Option<ServiceBrief>,
    pub customer: Option<UserSummary>,
    pub provider: Option<UserSummary>,
}

impl From<BookingView> for BookingResponse {
    fn from(view: BookingView) -> Self {
        let b = view.booking;
        Self {
            id: b.id,
            customer_id: b.customer_id,
            provider_id: b.provider_id,
            service_id: b.service_id,
            scheduled_date: b.scheduled_date,
            scheduled_time: b.scheduled_time,
            duration_minutes: b.duration_minutes,
            address: b.address,
            notes: b.notes,
            total_price: b.total_price,
            status: b.status,
            provider_notes: b.provider_notes,
            cancellation_reason: b.cancellation_reason,
            cancelled_by: b.cancelled_by,
            cancelled_at: b.cancelled_at,
            completed_at: b.completed_at,
            created_at: b.created_at,
            updated_at: b.updated_at,
            service: view.service.map(Into::into),
            customer: view.customer,
            provider: view.provider,
        }
    }
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReviewRequest {
    pub booking_id: Option<BookingId>,
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

impl Validate for CreateReviewRequest {
    fn validate(&self, v: &mut Validator) {
        v.check(
            self.booking_id.is_some(),
            "bookingId",
            "Booking is required",
            Value::Null,
        );
        check_rating(v, self.rating, true);
        v.optional_length(
            "comment",
            self.comment.as_deref(),
            0,
            COMMENT_MAX,
            "Comment must be at most 1000 characters",
        );
    }
}

impl CreateReviewRequest {
    pub fn into_parts(self) -> MarketResult<(BookingId, i16, Option<String>)> {
        let booking_id = self
            .booking_id
            .ok_or_else(|| missing("bookingId", "Booking is required"))?;
        let rating = self
            .rating
            .ok_or_else(|| missing("rating", "Rating is required"))?;
        Ok((booking_id, rating, self.comment))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateReviewRequest {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

impl Validate for UpdateReviewRequest {
    fn validate(&self, v: &mut Validator) {
        check_rating(v, self.rating, false);
        v.optional_length(
            "comment",
            self.comment.as_deref(),
            0,
            COMMENT_MAX,
            "Comment must be at most 1000 characters",
        );
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewReplyRequest {
    pub response: String,
}

impl Validate for ReviewReplyRequest {
    fn validate(&self, v: &mut Validator) {
        v.length(
            "response",
            &self.response,
            1,
            COMMENT_MAX,
            "Response must be between 1 and 1000 characters",
        );
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewApprovalRequest {
    pub is_approved: Option<bool>,
}

impl Validate for ReviewApprovalRequest {
    fn validate(&self, v: &mut Validator) {
        v.check(
            self.is_approved.is_some(),
            "isApproved",
            "isApproved is required",
            Value::Null,
        );
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: ReviewId,
    pub booking_id: BookingId,
    pub service_id: ServiceId,
    pub customer_id: UserId,
    pub provider_id: UserId,
    pub rating: i16,
    pub comment: Option<String>,
    pub provider_response: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceBrief>,
}

impl From<ReviewView> for ReviewResponse {
    fn from(view: ReviewView) -> Self {
        let r = view.review;
        Self {
            id: r.id,
            booking_id: r.booking_id,
            service_id: r.service_id,
            customer_id: r.customer_id,
            provider_id: r.provider_id,
            rating: r.rating,
            comment: r.comment,
            provider_response: r.provider_response,
            responded_at: r.responded_at,
            is_approved: r.is_approved,
            created_at: r.created_at,
            updated_at: r.updated_at,
            customer: view.customer,
            service: view.service.map(Into::into),
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendMessageRequest {
    pub receiver_id: Option<UserId>,
    pub content: String,
    pub booking_id: Option<BookingId>,
}

impl Validate for SendMessageRequest {
    fn validate(&self, v: &mut Validator) {
        v.check(
            self.receiver_id.is_some(),
            "receiverId",
            "Receiver is required",
            Value::Null,
        );
        v.length(
            "content",
            &self.content,
            1,
            MAX_MESSAGE_CHARS,
            "Message must be between 1 and 2000 characters",
        );
    }
}

impl SendMessageRequest {
    pub fn into_outgoing(self) -> MarketResult<OutgoingMessage> {
        Ok(OutgoingMessage {
            receiver_id: self
                .receiver_id
                .ok_or_else(|| missing("receiverId", "Receiver is required"))?,
            content: self.content,
            booking_id: self.booking_id,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub booking_id: Option<BookingId>,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<UserSummary>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            receiver_id: m.receiver_id,
            booking_id: m.booking_id,
            content: m.content,
            is_read: m.is_read,
            read_at: m.read_at,
            created_at: m.created_at,
            sender: None,
            receiver: None,
        }
    }
}

impl From<MessageView> for MessageResponse {
    fn from(view: MessageView) -> Self {
        Self {
            sender: view.sender,
            receiver: view.receiver,
            ..view.message.into()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub partner: Option<UserSummary>,
    pub last_message: MessageResponse,
    pub unread_count: u64,
}

impl From<ConversationView> for ConversationResponse {
    fn from(view: ConversationView) -> Self {
        Self {
            partner: view.partner,
            last_message: view.last_message.into(),
            unread_count: view.unread_count,
        }
    }
}

// ============================================================================
// Notifications / counters
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationListQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    pub unread_only: Option<String>,
}

impl NotificationListQuery {
    pub fn unread_only(&self) -> bool {
        parse_flag(self.unread_only.as_deref()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub data: Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponse {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title,
            body: n.body,
            data: n.payload,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpdatedResponse {
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::validation::validate;

    #[test]
    fn test_service_query_is_lenient() {
        let query: ServiceListQuery = serde_urlencoded_like(&[
            ("minPrice", "abc"),
            ("maxPrice", "150.5"),
            ("sort", "price_desc"),
            ("available", "maybe"),
            ("category", "home-repair"),
            ("page", "x"),
        ]);
        let filter = query.filter();
        assert_eq!(filter.min_price, None);
        assert_eq!(filter.max_price, Some(Decimal::new(1505, 1)));
        assert_eq!(filter.sort, ServiceSort::PriceDesc);
        assert_eq!(filter.available, None);
        assert_eq!(query.category(), Some(CategoryRef::Slug("home-repair".into())));
        assert_eq!(query.page.to_request().page(), 1);
    }

    fn serde_urlencoded_like(pairs: &[(&str, &str)]) -> ServiceListQuery {
        let map: serde_json::Map<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        serde_json::from_value(Value::Object(map)).unwrap()
    }

    #[test]
    fn test_create_service_validation() {
        let req: CreateServiceRequest = serde_json::from_value(json!({
            "title": {"en": "  "},
            "description": {"fr": "Réparation"},
            "price": -1,
            "priceType": "WEEKLY",
            "durationMinutes": 0
        }))
        .unwrap();
        let err = validate(&req).unwrap_err();
        let fields: Vec<&str> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["categoryId", "title", "price", "priceType", "durationMinutes"]
        );
    }

    #[test]
    fn test_create_service_defaults() {
        let req: CreateServiceRequest = serde_json::from_value(json!({
            "categoryId": "5f0c7a1e-9a43-4f0e-8d7b-2d6f4b1e3c21",
            "title": {"en": "Deep cleaning"},
            "description": {"en": "Whole flat"},
            "price": 80.25
        }))
        .unwrap();
        assert!(validate(&req).is_ok());
        let input = req.into_new_service().unwrap();
        assert_eq!(input.price_type, PriceType::Fixed);
        assert_eq!(input.price, Decimal::new(8025, 2));
    }

    #[test]
    fn test_booking_dates() {
        assert_eq!(parse_date("2030-05-01"), NaiveDate::from_ymd_opt(2030, 5, 1));
        assert_eq!(
            parse_date("2030-05-01T10:00:00Z"),
            NaiveDate::from_ymd_opt(2030, 5, 1)
        );
        assert_eq!(parse_date("01/05/2030"), None);
        assert_eq!(parse_time("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time("25:00"), None);
    }

    #[test]
    fn test_booking_status_filter() {
        let query = BookingListQuery {
            status: Some("completed".into()),
            ..Default::default()
        };
        assert_eq!(query.status().unwrap(), Some(BookingStatus::Completed));

        let query = BookingListQuery {
            status: Some("DONE".into()),
            ..Default::default()
        };
        assert!(query.status().is_err());
    }

    #[test]
    fn test_review_rating_bounds() {
        let req = CreateReviewRequest {
            booking_id: Some(BookingId::new()),
            rating: Some(6),
            comment: None,
        };
        let err = validate(&req).unwrap_err();
        assert_eq!(err.errors()[0].field, "rating");
    }

    #[test]
    fn test_price_serialized_as_number() {
        let brief = ServiceBrief {
            id: ServiceId::new(),
            title: LocalizedText::english("Tiling"),
            price: Decimal::new(4550, 2),
            price_type: PriceType::Hourly,
            images: vec![],
        };
        let json = serde_json::to_value(&brief).unwrap();
        assert_eq!(json["price"], json!(45.5));
        assert_eq!(json["priceType"], "HOURLY");
    }
}
