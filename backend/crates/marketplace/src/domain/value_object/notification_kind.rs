use serde::{Deserialize, Serialize};
use std::fmt;

/// What a notification is about, stored as SMALLINT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum NotificationKind {
    BookingCreated = 0,
    BookingStatusChanged = 1,
    BookingCancelled = 2,
    NewReview = 3,
    ReviewResponse = 4,
    NewMessage = 5,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 6] = [
        NotificationKind::BookingCreated,
        NotificationKind::BookingStatusChanged,
        NotificationKind::BookingCancelled,
        NotificationKind::NewReview,
        NotificationKind::ReviewResponse,
        NotificationKind::NewMessage,
    ];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub const fn code(&self) -> &'static str {
        use NotificationKind::*;
        match self {
            BookingCreated => "BOOKING_CREATED",
            BookingStatusChanged => "BOOKING_STATUS_CHANGED",
            BookingCancelled => "BOOKING_CANCELLED",
            NewReview => "NEW_REVIEW",
            ReviewResponse => "REVIEW_RESPONSE",
            NewMessage => "NEW_MESSAGE",
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
