//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Method names are unique across traits so one store can implement them all.

use kernel::id::{
    BookingId, CategoryId, MessageId, NotificationId, ReviewId, ServiceId, SubcategoryId, UserId,
};
use kernel::pagination::PageRequest;
use rust_decimal::Decimal;

use crate::domain::entity::{
    booking::Booking,
    category::{Category, Subcategory},
    message::{Conversation, Message},
    notification::Notification,
    review::Review,
    service::Service,
    user_summary::UserSummary,
};
use crate::domain::value_object::{booking_status::BookingStatus, rating::RatingSummary};
use crate::error::MarketResult;

// ============================================================================
// Filters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServiceSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

impl ServiceSort {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(ServiceSort::Newest),
            "price_asc" => Some(ServiceSort::PriceAsc),
            "price_desc" => Some(ServiceSort::PriceDesc),
            "rating" => Some(ServiceSort::Rating),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub provider_id: Option<UserId>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Case-insensitive match on any translation of title or description
    pub search: Option<String>,
    pub available: Option<bool>,
    /// `false` lists inactive services too (owner view)
    pub active_only: bool,
    pub sort: ServiceSort,
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub customer_id: Option<UserId>,
    pub provider_id: Option<UserId>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub service_id: Option<ServiceId>,
    pub customer_id: Option<UserId>,
    pub provider_id: Option<UserId>,
    pub approved_only: bool,
}

// ============================================================================
// Traits
// ============================================================================

/// Categories and service listings
#[trait_variant::make(CatalogRepository: Send)]
pub trait LocalCatalogRepository {
    /// With subcategories, ordered by `sort_order`
    async fn list_categories(&self, include_inactive: bool) -> MarketResult<Vec<Category>>;

    async fn find_category(&self, id: &CategoryId) -> MarketResult<Option<Category>>;

    async fn find_category_by_slug(&self, slug: &str) -> MarketResult<Option<Category>>;

    /// `MarketError::SlugTaken` on a duplicate slug
    async fn insert_category(&self, category: &Category) -> MarketResult<()>;

    /// `MarketError::SlugTaken` on a duplicate slug within the category
    async fn insert_subcategory(&self, subcategory: &Subcategory) -> MarketResult<()>;

    async fn insert_service(&self, service: &Service) -> MarketResult<()>;

    async fn find_service(&self, id: &ServiceId) -> MarketResult<Option<Service>>;

    async fn find_services(&self, ids: &[ServiceId]) -> MarketResult<Vec<Service>>;

    /// Persists listing fields; the rating columns are owned by review writes
    async fn update_service(&self, service: &Service) -> MarketResult<()>;

    async fn delete_service(&self, id: &ServiceId) -> MarketResult<()>;

    async fn list_services(
        &self,
        filter: &ServiceFilter,
        page: PageRequest,
    ) -> MarketResult<(Vec<Service>, u64)>;
}

#[trait_variant::make(BookingRepository: Send)]
pub trait LocalBookingRepository {
    async fn insert_booking(&self, booking: &Booking) -> MarketResult<()>;

    async fn find_booking(&self, id: &BookingId) -> MarketResult<Option<Booking>>;

    /// Writes only if the stored status still equals `expected`;
    /// otherwise `BookingStatusChanged`
    async fn update_booking(&self, booking: &Booking, expected: BookingStatus) -> MarketResult<()>;

    /// Newest first
    async fn list_bookings(
        &self,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> MarketResult<(Vec<Booking>, u64)>;

    /// Any PENDING, CONFIRMED or IN_PROGRESS booking for the service
    async fn has_open_bookings(&self, service_id: &ServiceId) -> MarketResult<bool>;
}

/// Review writes recompute the service rating in the same transaction,
/// after locking the service row.
#[trait_variant::make(ReviewRepository: Send)]
pub trait LocalReviewRepository {
    async fn find_review(&self, id: &ReviewId) -> MarketResult<Option<Review>>;

    async fn find_review_for_booking(
        &self,
        customer_id: &UserId,
        booking_id: &BookingId,
    ) -> MarketResult<Option<Review>>;

    /// Newest first
    async fn list_reviews(
        &self,
        filter: &ReviewFilter,
        page: PageRequest,
    ) -> MarketResult<(Vec<Review>, u64)>;

    /// `MarketError::AlreadyReviewed` on a second review of the booking
    async fn insert_review(&self, review: &Review) -> MarketResult<RatingSummary>;

    async fn save_review(&self, review: &Review) -> MarketResult<RatingSummary>;

    async fn remove_review(&self, review: &Review) -> MarketResult<RatingSummary>;
}

#[trait_variant::make(MessageRepository: Send)]
pub trait LocalMessageRepository {
    async fn insert_message(&self, message: &Message) -> MarketResult<()>;

    async fn find_message(&self, id: &MessageId) -> MarketResult<Option<Message>>;

    async fn save_message(&self, message: &Message) -> MarketResult<()>;

    /// Messages between two users, newest first
    async fn list_conversation(
        &self,
        user_id: &UserId,
        partner_id: &UserId,
        page: PageRequest,
    ) -> MarketResult<(Vec<Message>, u64)>;

    /// Marks what `partner_id` sent to `receiver_id` as read; returns the count
    async fn mark_conversation_read(
        &self,
        receiver_id: &UserId,
        partner_id: &UserId,
    ) -> MarketResult<u64>;

    /// Oldest first
    async fn list_booking_messages(&self, booking_id: &BookingId) -> MarketResult<Vec<Message>>;

    /// One entry per partner, most recent conversation first
    async fn list_conversations(&self, user_id: &UserId) -> MarketResult<Vec<Conversation>>;

    async fn count_unread_messages(&self, user_id: &UserId) -> MarketResult<u64>;
}

#[trait_variant::make(NotificationRepository: Send)]
pub trait LocalNotificationRepository {
    async fn insert_notification(&self, notification: &Notification) -> MarketResult<()>;

    /// Newest first
    async fn list_notifications(
        &self,
        user_id: &UserId,
        unread_only: bool,
        page: PageRequest,
    ) -> MarketResult<(Vec<Notification>, u64)>;

    async fn count_unread_notifications(&self, user_id: &UserId) -> MarketResult<u64>;

    /// `false` when the notification is not the user's
    async fn mark_notification_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> MarketResult<bool>;

    async fn mark_all_notifications_read(&self, user_id: &UserId) -> MarketResult<u64>;

    /// `false` when the notification is not the user's
    async fn delete_notification(&self, user_id: &UserId, id: &NotificationId)
    -> MarketResult<bool>;
}

/// Read access to the users table owned by the auth crate
#[trait_variant::make(UserDirectory: Send)]
pub trait LocalUserDirectory {
    async fn find_user_summary(&self, id: &UserId) -> MarketResult<Option<UserSummary>>;

    async fn find_user_summaries(&self, ids: &[UserId]) -> MarketResult<Vec<UserSummary>>;
}

/// Everything the marketplace handlers need from storage
pub trait MarketStore:
    CatalogRepository
    + BookingRepository
    + ReviewRepository
    + MessageRepository
    + NotificationRepository
    + UserDirectory
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> MarketStore for T where
    T: CatalogRepository
        + BookingRepository
        + ReviewRepository
        + MessageRepository
        + NotificationRepository
        + UserDirectory
        + Clone
        + Send
        + Sync
        + 'static
{
}
