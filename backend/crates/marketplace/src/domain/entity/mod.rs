//! Entities

pub mod booking;
pub mod category;
pub mod message;
pub mod notification;
pub mod review;
pub mod service;
pub mod user_summary;
