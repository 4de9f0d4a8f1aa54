//! `/bookings`

use serde_json::json;
use uuid::Uuid;

use crate::client::{ApiClient, Call};
use crate::error::ClientResult;
use crate::models::{Booking, BookingStatus, NewBooking, PageParams, Paged};

impl ApiClient {
    pub async fn create_booking(&self, booking: &NewBooking) -> ClientResult<Booking> {
        self.data(Call::post("/bookings").json(booking)?).await
    }

    /// Bookings visible to the caller's role
    pub async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        page: PageParams,
    ) -> ClientResult<Paged<Booking>> {
        let mut pairs = page.pairs();
        if let Some(status) = status {
            pairs.push(("status", status.code().to_string()));
        }
        self.paged(Call::get("/bookings").query(pairs)).await
    }

    pub async fn get_booking(&self, id: Uuid) -> ClientResult<Booking> {
        self.data(Call::get(format!("/bookings/{id}"))).await
    }

    pub async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        provider_notes: Option<&str>,
    ) -> ClientResult<Booking> {
        let body = json!({ "status": status, "providerNotes": provider_notes });
        self.data(Call::patch(format!("/bookings/{id}/status")).json(&body)?)
            .await
    }

    pub async fn cancel_booking(&self, id: Uuid, reason: Option<&str>) -> ClientResult<Booking> {
        let body = json!({ "reason": reason });
        self.data(Call::patch(format!("/bookings/{id}/cancel")).json(&body)?)
            .await
    }
}
