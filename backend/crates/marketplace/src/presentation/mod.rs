//! Presentation Layer
//!
//! HTTP handlers, DTOs and routers.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::MarketAppState;
pub use router::{
    bookings_router_generic, marketplace_router, marketplace_router_generic,
    messages_router_generic, notifications_router_generic, reviews_router_generic,
    services_router_generic,
};
