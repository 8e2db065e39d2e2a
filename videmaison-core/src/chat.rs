use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{UserId, id::prefixed_id};

prefixed_id!(MessageId, "msg");

pub const DEFAULT_MESSAGE_TYPE: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub message_type: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
