//! In-app notification

use chrono::{DateTime, Utc};
use kernel::id::{NotificationId, UserId};
use serde_json::Value;

use crate::domain::value_object::notification_kind::NotificationKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Ids the client needs to link to the subject
    pub payload: Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            kind,
            title: title.into(),
            body: body.into(),
            payload,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
