//! Application Layer
//!
//! Use cases of the marketplace. Each use case takes the acting user
//! explicitly and enforces ownership before touching storage.

pub mod bookings;
pub mod catalog;
pub mod config;
pub(crate) mod lookup;
pub mod messages;
pub mod notifications;
pub mod reviews;
pub mod services;

pub use bookings::{BookingUseCase, BookingView};
pub use catalog::{CategoryInput, CategoryUseCase};
pub use config::MarketConfig;
pub use messages::{ConversationView, MessageUseCase, MessageView, OutgoingMessage};
pub use notifications::NotificationUseCase;
pub use reviews::{ReviewUseCase, ReviewView};
pub use services::{DeleteOutcome, ServiceChanges, ServiceDetail, ServiceUseCase, ServiceView};
