//! `/notifications`

use uuid::Uuid;

use crate::client::{ApiClient, Call};
use crate::error::ClientResult;
use crate::models::{Count, Notification, PageParams, Paged, Updated};

impl ApiClient {
    pub async fn notifications(
        &self,
        unread_only: bool,
        page: PageParams,
    ) -> ClientResult<Paged<Notification>> {
        let mut pairs = page.pairs();
        if unread_only {
            pairs.push(("unreadOnly", "true".to_string()));
        }
        self.paged(Call::get("/notifications").query(pairs)).await
    }

    pub async fn unread_notification_count(&self) -> ClientResult<u64> {
        let count: Count = self.data(Call::get("/notifications/unread-count")).await?;
        Ok(count.count)
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> ClientResult<()> {
        self.message(Call::patch(format!("/notifications/{id}/read")))
            .await?;
        Ok(())
    }

    /// Returns how many were marked
    pub async fn mark_all_notifications_read(&self) -> ClientResult<u64> {
        let updated: Updated = self.data(Call::patch("/notifications/read-all")).await?;
        Ok(updated.updated)
    }

    pub async fn delete_notification(&self, id: Uuid) -> ClientResult<()> {
        self.message(Call::delete(format!("/notifications/{id}")))
            .await?;
        Ok(())
    }
}
