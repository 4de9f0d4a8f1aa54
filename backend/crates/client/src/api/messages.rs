//! `/messages`

use uuid::Uuid;

use crate::client::{ApiClient, Call};
use crate::error::ClientResult;
use crate::models::{Conversation, Count, Message, NewMessage, PageParams, Paged};

impl ApiClient {
    pub async fn send_message(&self, message: &NewMessage) -> ClientResult<Message> {
        self.data(Call::post("/messages").json(message)?).await
    }

    /// One entry per partner, most recent first
    pub async fn conversations(&self) -> ClientResult<Vec<Conversation>> {
        self.data(Call::get("/messages/conversations")).await
    }

    /// Marks the partner's messages read; each page is oldest first
    pub async fn conversation(
        &self,
        partner_id: Uuid,
        page: PageParams,
    ) -> ClientResult<Paged<Message>> {
        self.paged(Call::get(format!("/messages/conversation/{partner_id}")).query(page.pairs()))
            .await
    }

    pub async fn booking_messages(&self, booking_id: Uuid) -> ClientResult<Vec<Message>> {
        self.data(Call::get(format!("/messages/booking/{booking_id}")))
            .await
    }

    pub async fn mark_message_read(&self, id: Uuid) -> ClientResult<Message> {
        self.data(Call::patch(format!("/messages/{id}/read"))).await
    }

    pub async fn unread_message_count(&self) -> ClientResult<u64> {
        let count: Count = self.data(Call::get("/messages/unread-count")).await?;
        Ok(count.count)
    }
}
