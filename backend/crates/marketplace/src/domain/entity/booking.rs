//! Booking between a customer and a provider for one service

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kernel::id::{BookingId, ServiceId, UserId};
use rust_decimal::Decimal;

use crate::domain::entity::service::Service;
use crate::domain::value_object::booking_status::BookingStatus;
use crate::error::{MarketError, MarketResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: BookingId,
    pub customer_id: UserId,
    pub provider_id: UserId,
    pub service_id: ServiceId,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub address: Option<String>,
    pub notes: Option<String>,
    /// Copied from the service when booked
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub provider_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<UserId>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl Booking {
    pub fn new(customer_id: UserId, service: &Service, input: NewBooking) -> Self {
        let now = Utc::now();
        Self {
            id: BookingId::new(),
            customer_id,
            provider_id: service.provider_id,
            service_id: service.id,
            scheduled_date: input.scheduled_date,
            scheduled_time: input.scheduled_time,
            duration_minutes: input.duration_minutes.or(service.duration_minutes),
            address: input.address,
            notes: input.notes,
            total_price: service.price,
            status: BookingStatus::Pending,
            provider_notes: None,
            cancellation_reason: None,
            cancelled_by: None,
            cancelled_at: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: &UserId) -> bool {
        &self.customer_id == user_id || &self.provider_id == user_id
    }

    /// Provider-driven status change; returns the previous status
    pub fn change_status(
        &mut self,
        next: BookingStatus,
        provider_notes: Option<String>,
    ) -> MarketResult<BookingStatus> {
        let previous = self.status;
        if previous == next {
            return Err(MarketError::AlreadyInStatus(next));
        }
        if !previous.can_transition_to(next) {
            return Err(MarketError::InvalidTransition {
                from: previous,
                to: next,
            });
        }

        let now = Utc::now();
        self.status = next;
        if provider_notes.is_some() {
            self.provider_notes = provider_notes;
        }
        if next == BookingStatus::Completed {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        Ok(previous)
    }

    /// Customer cancellation
    pub fn cancel(&mut self, by: UserId, reason: Option<String>) -> MarketResult<()> {
        if self.status == BookingStatus::Cancelled {
            return Err(MarketError::AlreadyInStatus(BookingStatus::Cancelled));
        }
        if !self.status.is_cancellable() {
            return Err(MarketError::NotCancellable(self.status));
        }

        let now = Utc::now();
        self.status = BookingStatus::Cancelled;
        self.cancellation_reason = reason;
        self.cancelled_by = Some(by);
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}
