//! Value Object Module

pub mod booking_status;
pub mod notification_kind;
pub mod price_type;
pub mod rating;
