use async_trait::async_trait;

use crate::{ChatMessage, Error, MessageId, UserId};

#[async_trait]
pub trait ChatRepository: Send + Sync + 'static {
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage, Error>;

    /// Messages exchanged between `a` and `b` in either direction, oldest first.
    async fn conversation(&self, a: &UserId, b: &UserId) -> Result<Vec<ChatMessage>, Error>;

    /// Returns `false` when the message does not exist.
    async fn mark_read(&self, id: &MessageId) -> Result<bool, Error>;
}
