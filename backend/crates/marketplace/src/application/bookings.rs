//! Booking Use Cases

use std::sync::Arc;

use auth::{AuthUser, UserRole};
use chrono::Utc;
use kernel::i18n::Language;
use kernel::id::{BookingId, ServiceId};
use kernel::pagination::{Page, PageRequest};
use serde_json::json;

use crate::application::lookup::{services_by_id, users_by_id};
use crate::application::notifications::notify;
use crate::domain::entity::booking::{Booking, NewBooking};
use crate::domain::entity::notification::Notification;
use crate::domain::entity::service::Service;
use crate::domain::entity::user_summary::UserSummary;
use crate::domain::repository::{
    BookingFilter, BookingRepository, CatalogRepository, NotificationRepository, UserDirectory,
};
use crate::domain::value_object::booking_status::BookingStatus;
use crate::domain::value_object::notification_kind::NotificationKind;
use crate::error::{MarketError, MarketResult};

/// Booking with its service and both participants
#[derive(Debug, Clone)]
pub struct BookingView {
    pub booking: Booking,
    pub service: Option<Service>,
    pub customer: Option<UserSummary>,
    pub provider: Option<UserSummary>,
}

pub struct BookingUseCase<R>
where
    R: BookingRepository + CatalogRepository + NotificationRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> BookingUseCase<R>
where
    R: BookingRepository + CatalogRepository + NotificationRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        actor: &AuthUser,
        service_id: &ServiceId,
        input: NewBooking,
    ) -> MarketResult<BookingView> {
        if input.scheduled_date < Utc::now().date_naive() {
            return Err(MarketError::invalid_field(
                "scheduledDate",
                "Scheduled date cannot be in the past",
                json!(input.scheduled_date),
            ));
        }

        let service = self
            .repo
            .find_service(service_id)
            .await?
            .ok_or(MarketError::ServiceNotFound)?;
        if !service.is_bookable() {
            return Err(MarketError::ServiceNotBookable);
        }
        if service.is_owned_by(&actor.id) {
            return Err(MarketError::SelfBooking);
        }

        let booking = Booking::new(actor.id, &service, input);
        self.repo.insert_booking(&booking).await?;

        tracing::info!(
            booking_id = %booking.id,
            service_id = %service.id,
            customer_id = %actor.id,
            provider_id = %booking.provider_id,
            "Booking created"
        );

        notify(
            self.repo.as_ref(),
            Notification::new(
                booking.provider_id,
                NotificationKind::BookingCreated,
                "New booking request",
                format!(
                    "New booking for \"{}\" on {}",
                    service.title.resolve(Language::En),
                    booking.scheduled_date
                ),
                json!({ "bookingId": booking.id, "serviceId": service.id }),
            ),
        )
        .await;

        self.view(booking).await
    }

    /// Customers see their bookings, providers the bookings of their
    /// services, admins everything
    pub async fn list(
        &self,
        actor: &AuthUser,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> MarketResult<Page<BookingView>> {
        let mut filter = BookingFilter {
            status,
            ..BookingFilter::default()
        };
        match actor.role {
            UserRole::Customer => filter.customer_id = Some(actor.id),
            UserRole::Provider => filter.provider_id = Some(actor.id),
            UserRole::Admin => {}
        }

        let (bookings, total) = self.repo.list_bookings(&filter, page).await?;
        let views = self.views(bookings).await?;
        Ok(Page::new(views, page, total))
    }

    /// Participants or admin
    pub async fn get(&self, actor: &AuthUser, id: &BookingId) -> MarketResult<BookingView> {
        let booking = self.find(id).await?;
        if !booking.is_participant(&actor.id) && !actor.is_admin() {
            return Err(MarketError::NotBookingParticipant);
        }
        self.view(booking).await
    }

    /// Provider-driven transition
    pub async fn update_status(
        &self,
        actor: &AuthUser,
        id: &BookingId,
        status: BookingStatus,
        provider_notes: Option<String>,
    ) -> MarketResult<BookingView> {
        let mut booking = self.find(id).await?;
        if booking.provider_id != actor.id {
            return Err(MarketError::NotBookingProvider);
        }

        let previous = booking.change_status(status, provider_notes)?;
        self.repo.update_booking(&booking, previous).await?;

        tracing::info!(
            booking_id = %booking.id,
            from = %previous,
            to = %status,
            "Booking status changed"
        );

        notify(
            self.repo.as_ref(),
            Notification::new(
                booking.customer_id,
                NotificationKind::BookingStatusChanged,
                "Booking updated",
                format!("Your booking is now {}", status.label()),
                json!({ "bookingId": booking.id, "status": status }),
            ),
        )
        .await;

        self.view(booking).await
    }

    /// Customer cancellation of a pending or confirmed booking
    pub async fn cancel(
        &self,
        actor: &AuthUser,
        id: &BookingId,
        reason: Option<String>,
    ) -> MarketResult<BookingView> {
        let mut booking = self.find(id).await?;
        if booking.customer_id != actor.id {
            return Err(MarketError::NotBookingCustomer);
        }

        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        let previous = booking.status;
        booking.cancel(actor.id, reason)?;
        self.repo.update_booking(&booking, previous).await?;

        tracing::info!(booking_id = %booking.id, customer_id = %actor.id, "Booking cancelled");

        notify(
            self.repo.as_ref(),
            Notification::new(
                booking.provider_id,
                NotificationKind::BookingCancelled,
                "Booking cancelled",
                format!(
                    "The booking scheduled for {} was cancelled",
                    booking.scheduled_date
                ),
                json!({ "bookingId": booking.id }),
            ),
        )
        .await;

        self.view(booking).await
    }

    async fn find(&self, id: &BookingId) -> MarketResult<Booking> {
        self.repo
            .find_booking(id)
            .await?
            .ok_or(MarketError::BookingNotFound)
    }

    async fn view(&self, booking: Booking) -> MarketResult<BookingView> {
        let mut views = self.views(vec![booking]).await?;
        views
            .pop()
            .ok_or_else(|| MarketError::Internal("empty booking view".into()))
    }

    async fn views(&self, bookings: Vec<Booking>) -> MarketResult<Vec<BookingView>> {
        let users = users_by_id(
            self.repo.as_ref(),
            bookings
                .iter()
                .flat_map(|b| [b.customer_id, b.provider_id]),
        )
        .await?;
        let services =
            services_by_id(self.repo.as_ref(), bookings.iter().map(|b| b.service_id)).await?;

        Ok(bookings
            .into_iter()
            .map(|booking| BookingView {
                service: services.get(&booking.service_id).cloned(),
                customer: users.get(&booking.customer_id).cloned(),
                provider: users.get(&booking.provider_id).cloned(),
                booking,
            })
            .collect())
    }
}
