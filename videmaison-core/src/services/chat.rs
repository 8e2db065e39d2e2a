use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::{
    ChatMessage, Error, MessageId, UserId,
    chat::DEFAULT_MESSAGE_TYPE,
    push::{PushChannel, PushTarget},
    repositories::ChatRepository,
    validation::{check_max_length, require_fields},
};

const MAX_CONTENT_LENGTH: usize = 5000;

/// Direct messages between two users.
pub struct ChatService<C: ChatRepository> {
    messages: Arc<C>,
    push: Arc<dyn PushChannel>,
}

impl<C: ChatRepository> ChatService<C> {
    pub fn new(messages: Arc<C>, push: Arc<dyn PushChannel>) -> Self {
        Self { messages, push }
    }

    /// Stores the message and pushes `new_message` to the receiver's room.
    pub async fn send_message(
        &self,
        sender: &UserId,
        receiver: &UserId,
        content: &str,
        message_type: Option<&str>,
    ) -> Result<ChatMessage, Error> {
        require_fields(&[("content", Some(content))])?;
        check_max_length("content", content, MAX_CONTENT_LENGTH)?;

        let message = ChatMessage {
            id: MessageId::new_random(),
            sender_id: sender.clone(),
            receiver_id: receiver.clone(),
            content: content.to_string(),
            message_type: message_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(DEFAULT_MESSAGE_TYPE)
                .to_string(),
            read: false,
            created_at: Utc::now(),
        };
        let message = self.messages.create(&message).await?;

        tracing::debug!(message_id = %message.id, sender = %sender, receiver = %receiver, "Chat message sent");

        self.push.emit(
            "new_message",
            json!({
                "id": message.id,
                "sender_id": message.sender_id,
                "content": message.content,
                "message_type": message.message_type,
                "created_at": message.created_at.to_rfc3339(),
            }),
            PushTarget::room(receiver.as_str()),
        );

        Ok(message)
    }

    pub async fn conversation(&self, a: &UserId, b: &UserId) -> Result<Vec<ChatMessage>, Error> {
        self.messages.conversation(a, b).await
    }

    pub async fn mark_read(&self, id: &MessageId) -> Result<(), Error> {
        if !self.messages.mark_read(id).await? {
            return Err(Error::NotFound("Message not found".to_string()));
        }
        Ok(())
    }
}
