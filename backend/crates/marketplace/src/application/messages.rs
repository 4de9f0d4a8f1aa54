//! Messaging Use Cases

use std::sync::Arc;

use auth::AuthUser;
use kernel::id::{BookingId, MessageId, UserId};
use kernel::pagination::{Page, PageRequest};
use serde_json::json;

use crate::application::lookup::users_by_id;
use crate::application::notifications::notify;
use crate::domain::entity::message::{MAX_MESSAGE_CHARS, Message};
use crate::domain::entity::notification::Notification;
use crate::domain::entity::user_summary::UserSummary;
use crate::domain::repository::{
    BookingRepository, MessageRepository, NotificationRepository, UserDirectory,
};
use crate::domain::value_object::notification_kind::NotificationKind;
use crate::error::{MarketError, MarketResult};

/// Characters of the message quoted in the notification body
const PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone)]
pub struct MessageView {
    pub message: Message,
    pub sender: Option<UserSummary>,
    pub receiver: Option<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct ConversationView {
    pub partner: Option<UserSummary>,
    pub last_message: Message,
    pub unread_count: u64,
}

#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub receiver_id: UserId,
    pub content: String,
    pub booking_id: Option<BookingId>,
}

pub struct MessageUseCase<R>
where
    R: MessageRepository + BookingRepository + NotificationRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> MessageUseCase<R>
where
    R: MessageRepository + BookingRepository + NotificationRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn send(
        &self,
        actor: &AuthUser,
        input: OutgoingMessage,
    ) -> MarketResult<MessageView> {
        if input.receiver_id == actor.id {
            return Err(MarketError::SelfMessage);
        }

        let content = input.content.trim().to_string();
        let chars = content.chars().count();
        if chars == 0 || chars > MAX_MESSAGE_CHARS {
            return Err(MarketError::invalid_field(
                "content",
                format!("Message must be between 1 and {MAX_MESSAGE_CHARS} characters"),
                json!(chars),
            ));
        }

        let receiver = self
            .repo
            .find_user_summary(&input.receiver_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(MarketError::ReceiverNotFound)?;

        if let Some(booking_id) = &input.booking_id {
            let booking = self
                .repo
                .find_booking(booking_id)
                .await?
                .ok_or(MarketError::BookingNotFound)?;
            if !booking.is_participant(&actor.id) || !booking.is_participant(&receiver.id) {
                return Err(MarketError::NotConversationParticipant);
            }
        }

        let message = Message::new(actor.id, receiver.id, input.booking_id, content);
        self.repo.insert_message(&message).await?;

        tracing::info!(
            message_id = %message.id,
            sender_id = %actor.id,
            receiver_id = %receiver.id,
            "Message sent"
        );

        let sender = self.repo.find_user_summary(&actor.id).await?;
        let from = sender
            .as_ref()
            .map(|s| format!("{} {}", s.first_name, s.last_name))
            .unwrap_or_else(|| "Someone".to_string());
        notify(
            self.repo.as_ref(),
            Notification::new(
                receiver.id,
                NotificationKind::NewMessage,
                format!("New message from {from}"),
                preview(&message.content),
                json!({
                    "messageId": message.id,
                    "senderId": actor.id,
                    "bookingId": message.booking_id,
                }),
            ),
        )
        .await;

        Ok(MessageView {
            message,
            sender,
            receiver: Some(receiver),
        })
    }

    /// Inbox: one entry per partner, latest first
    pub async fn conversations(&self, actor: &AuthUser) -> MarketResult<Vec<ConversationView>> {
        let conversations = self.repo.list_conversations(&actor.id).await?;
        let partners = users_by_id(
            self.repo.as_ref(),
            conversations.iter().map(|c| c.partner_id),
        )
        .await?;

        Ok(conversations
            .into_iter()
            .map(|c| ConversationView {
                partner: partners.get(&c.partner_id).cloned(),
                last_message: c.last_message,
                unread_count: c.unread_count,
            })
            .collect())
    }

    /// Marks what the partner sent as read, then pages newest first with
    /// each page in chronological order
    pub async fn conversation(
        &self,
        actor: &AuthUser,
        partner_id: &UserId,
        page: PageRequest,
    ) -> MarketResult<Page<MessageView>> {
        let marked = self
            .repo
            .mark_conversation_read(&actor.id, partner_id)
            .await?;
        if marked > 0 {
            tracing::debug!(
                user_id = %actor.id,
                partner_id = %partner_id,
                marked,
                "Conversation read"
            );
        }

        let (mut messages, total) = self
            .repo
            .list_conversation(&actor.id, partner_id, page)
            .await?;
        messages.reverse();

        let views = self.views(messages).await?;
        Ok(Page::new(views, page, total))
    }

    /// Participants or admin, oldest first
    pub async fn booking_messages(
        &self,
        actor: &AuthUser,
        booking_id: &BookingId,
    ) -> MarketResult<Vec<MessageView>> {
        let booking = self
            .repo
            .find_booking(booking_id)
            .await?
            .ok_or(MarketError::BookingNotFound)?;
        if !booking.is_participant(&actor.id) && !actor.is_admin() {
            return Err(MarketError::NotBookingParticipant);
        }

        let messages = self.repo.list_booking_messages(&booking.id).await?;
        self.views(messages).await
    }

    /// Receiver only; repeated calls keep the first `read_at`
    pub async fn mark_read(&self, actor: &AuthUser, id: &MessageId) -> MarketResult<Message> {
        let mut message = self
            .repo
            .find_message(id)
            .await?
            .ok_or(MarketError::MessageNotFound)?;
        if message.receiver_id != actor.id {
            return Err(MarketError::NotMessageReceiver);
        }

        if !message.is_read {
            message.mark_read();
            self.repo.save_message(&message).await?;
        }
        Ok(message)
    }

    pub async fn unread_count(&self, actor: &AuthUser) -> MarketResult<u64> {
        self.repo.count_unread_messages(&actor.id).await
    }

    async fn views(&self, messages: Vec<Message>) -> MarketResult<Vec<MessageView>> {
        let users = users_by_id(
            self.repo.as_ref(),
            messages.iter().flat_map(|m| [m.sender_id, m.receiver_id]),
        )
        .await?;

        Ok(messages
            .into_iter()
            .map(|message| MessageView {
                sender: users.get(&message.sender_id).cloned(),
                receiver: users.get(&message.receiver_id).cloned(),
                message,
            })
            .collect())
    }
}

fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        return content.to_string();
    }
    let cut: String = content.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}…")
}
