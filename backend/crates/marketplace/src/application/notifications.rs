//! Notification Use Cases
//!
//! Notifications are written as a side effect of bookings, reviews and
//! messages. A failed write never fails the originating request.

use std::sync::Arc;

use auth::AuthUser;
use kernel::id::NotificationId;
use kernel::pagination::{Page, PageRequest};

use crate::domain::entity::notification::Notification;
use crate::domain::repository::NotificationRepository;
use crate::error::{MarketError, MarketResult};

/// Store a notification; failures are logged and swallowed
pub(crate) async fn notify<R>(repo: &R, notification: Notification)
where
    R: NotificationRepository,
{
    if let Err(e) = repo.insert_notification(&notification).await {
        tracing::warn!(
            error = %e,
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Failed to store notification"
        );
    }
}

pub struct NotificationUseCase<R>
where
    R: NotificationRepository,
{
    repo: Arc<R>,
}

impl<R> NotificationUseCase<R>
where
    R: NotificationRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        actor: &AuthUser,
        unread_only: bool,
        page: PageRequest,
    ) -> MarketResult<Page<Notification>> {
        let (items, total) = self
            .repo
            .list_notifications(&actor.id, unread_only, page)
            .await?;
        Ok(Page::new(items, page, total))
    }

    pub async fn unread_count(&self, actor: &AuthUser) -> MarketResult<u64> {
        self.repo.count_unread_notifications(&actor.id).await
    }

    pub async fn mark_read(&self, actor: &AuthUser, id: &NotificationId) -> MarketResult<()> {
        if !self.repo.mark_notification_read(&actor.id, id).await? {
            return Err(MarketError::NotificationNotFound);
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, actor: &AuthUser) -> MarketResult<u64> {
        let updated = self.repo.mark_all_notifications_read(&actor.id).await?;
        tracing::debug!(user_id = %actor.id, updated, "Notifications marked read");
        Ok(updated)
    }

    pub async fn delete(&self, actor: &AuthUser, id: &NotificationId) -> MarketResult<()> {
        if !self.repo.delete_notification(&actor.id, id).await? {
            return Err(MarketError::NotificationNotFound);
        }
        Ok(())
    }
}
