use async_trait::async_trait;
use sqlx::SqlitePool;
use videmaison_core::{ChatMessage, Error, MessageId, UserId, repositories::ChatRepository};

use crate::{SqliteChatMessage, repositories::database_error};

pub struct SqliteChatRepository {
    pool: SqlitePool,
}

impl SqliteChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for SqliteChatRepository {
    async fn create(&self, message: &ChatMessage) -> Result<ChatMessage, Error> {
        let row = sqlx::query_as::<_, SqliteChatMessage>(
            r#"
            INSERT INTO chat_messages (id, sender_id, receiver_id, content, message_type, read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING *
            "#,
        )
        .bind(message.id.as_str())
        .bind(message.sender_id.as_str())
        .bind(message.receiver_id.as_str())
        .bind(&message.content)
        .bind(&message.message_type)
        .bind(message.read)
        .bind(message.created_at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("Failed to store chat message"))?;

        Ok(row.into())
    }

    async fn conversation(&self, a: &UserId, b: &UserId) -> Result<Vec<ChatMessage>, Error> {
        let rows = sqlx::query_as::<_, SqliteChatMessage>(
            r#"
            SELECT * FROM chat_messages
            WHERE (sender_id = ?1 AND receiver_id = ?2)
               OR (sender_id = ?2 AND receiver_id = ?1)
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(a.as_str())
        .bind(b.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to load conversation"))?;

        Ok(rows.into_iter().map(ChatMessage::from).collect())
    }

    async fn mark_read(&self, id: &MessageId) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE chat_messages SET read = 1 WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error("Failed to mark message read"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use videmaison_core::repositories::ChatRepositoryProvider;

    use super::*;
    use crate::test_support::migrated_provider;

    fn message(from: &str, to: &str, content: &str) -> ChatMessage {
        ChatMessage {
            id: MessageId::new_random(),
            sender_id: UserId::new(from),
            receiver_id: UserId::new(to),
            content: content.to_string(),
            message_type: "text".to_string(),
            read: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_conversation_in_both_directions() {
        let provider = migrated_provider().await;
        let repo = provider.chat();

        repo.create(&message("usr_a", "usr_b", "first")).await.unwrap();
        repo.create(&message("usr_b", "usr_a", "second")).await.unwrap();
        repo.create(&message("usr_a", "usr_c", "elsewhere")).await.unwrap();

        let conversation = repo
            .conversation(&UserId::new("usr_b"), &UserId::new("usr_a"))
            .await
            .unwrap();
        let contents: Vec<_> = conversation.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_mark_read() {
        let provider = migrated_provider().await;
        let repo = provider.chat();
        let stored = repo.create(&message("usr_a", "usr_b", "hello")).await.unwrap();
        assert!(!stored.read);

        assert!(repo.mark_read(&stored.id).await.unwrap());
        assert!(!repo.mark_read(&MessageId::new("msg_missing")).await.unwrap());

        let conversation = repo
            .conversation(&stored.sender_id, &stored.receiver_id)
            .await
            .unwrap();
        assert!(conversation[0].read);
    }
}
