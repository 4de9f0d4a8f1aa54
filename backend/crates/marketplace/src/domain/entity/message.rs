//! Direct message, optionally attached to a booking

use chrono::{DateTime, Utc};
use kernel::id::{BookingId, MessageId, UserId};

pub const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub booking_id: Option<BookingId>,
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender_id: UserId,
        receiver_id: UserId,
        booking_id: Option<BookingId>,
        content: String,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender_id,
            receiver_id,
            booking_id,
            content,
            is_read: false,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    /// The other side of the conversation as seen by `user_id`
    pub fn partner_of(&self, user_id: &UserId) -> UserId {
        if &self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }

    /// Idempotent
    pub fn mark_read(&mut self) {
        if !self.is_read {
            self.is_read = true;
            self.read_at = Some(Utc::now());
        }
    }
}

/// One entry of a user's inbox
#[derive(Debug, Clone)]
pub struct Conversation {
    pub partner_id: UserId,
    pub last_message: Message,
    pub unread_count: u64,
}
