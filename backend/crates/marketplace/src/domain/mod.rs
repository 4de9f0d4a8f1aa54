//! Domain Layer
//!
//! Entities, value objects and repository traits of the marketplace.

pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::{
    booking::Booking,
    category::{Category, Subcategory},
    message::{Conversation, Message},
    notification::Notification,
    review::Review,
    service::Service,
    user_summary::UserSummary,
};
pub use repository::{
    BookingRepository, CatalogRepository, MarketStore, MessageRepository, NotificationRepository,
    ReviewRepository, UserDirectory,
};
