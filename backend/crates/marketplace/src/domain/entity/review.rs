//! Customer review of a completed booking

use chrono::{DateTime, Utc};
use kernel::id::{BookingId, ReviewId, ServiceId, UserId};

use crate::domain::entity::booking::Booking;

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: ReviewId,
    pub booking_id: BookingId,
    pub service_id: ServiceId,
    pub customer_id: UserId,
    pub provider_id: UserId,
    /// 1..=5
    pub rating: i16,
    pub comment: Option<String>,
    pub provider_response: Option<String>,
    pub responded_at: Option<DateTime<Utc>>,
    /// Only approved reviews count towards the service rating
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(booking: &Booking, rating: i16, comment: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ReviewId::new(),
            booking_id: booking.id,
            service_id: booking.service_id,
            customer_id: booking.customer_id,
            provider_id: booking.provider_id,
            rating,
            comment,
            provider_response: None,
            responded_at: None,
            is_approved: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn edit(&mut self, rating: Option<i16>, comment: Option<String>) {
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(comment) = comment {
            let comment = comment.trim().to_string();
            self.comment = (!comment.is_empty()).then_some(comment);
        }
        self.updated_at = Utc::now();
    }

    pub fn respond(&mut self, response: String) {
        let now = Utc::now();
        self.provider_response = Some(response);
        self.responded_at = Some(now);
        self.updated_at = now;
    }

    pub fn set_approved(&mut self, approved: bool) {
        self.is_approved = approved;
        self.updated_at = Utc::now();
    }
}
