//! PostgreSQL conversation store implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use letstalk_core::AppResult;
use letstalk_core::error::{AppError, ErrorKind};
use letstalk_core::types::id::{ConversationId, UserId};
use letstalk_entity::conversation::Conversation;
use letstalk_entity::message::{Message, NewMessage};

use crate::store::ConversationStore;

/// Conversation repository over PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    /// Create a new conversation store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: ConversationId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM conversations WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check conversation", e)
            })
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn find_or_create(&self, x: UserId, y: UserId) -> AppResult<(Conversation, bool)> {
        let (lo, hi) = Conversation::normalize_pair(x, y);

        // The unique index on the normalized pair makes the insert
        // idempotent; a concurrent create loses the race and falls through
        // to the re-fetch.
        let inserted = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (participant_a, participant_b) \
             VALUES ($1, $2) \
             ON CONFLICT (participant_a, participant_b) DO NOTHING \
             RETURNING *",
        )
        .bind(lo)
        .bind(hi)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create conversation", e)
        })?;

        if let Some(conversation) = inserted {
            return Ok((conversation, true));
        }

        let existing = sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations WHERE participant_a = $1 AND participant_b = $2",
        )
        .bind(lo)
        .bind(hi)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fetch conversation", e)
        })?;

        // Conversations are never deleted, so a missing row here means the
        // racing insert has not become visible yet; the caller retries.
        existing
            .map(|c| (c, false))
            .ok_or_else(|| AppError::conflict("Lost conversation create race"))
    }

    async fn find_by_id(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find conversation", e)
            })
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Conversation>> {
        sqlx::query_as::<_, Conversation>(
            "SELECT * FROM conversations \
             WHERE participant_a = $1 OR participant_b = $1 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list conversations", e))
    }

    async fn append_message(&self, data: &NewMessage) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (conversation_id, sender_id, recipient_id, kind, body) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(data.conversation_id)
        .bind(data.sender_id)
        .bind(data.recipient_id)
        .bind(data.kind)
        .bind(&data.body)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("messages_conversation_id_fkey") =>
            {
                AppError::not_found(format!("Conversation {} not found", data.conversation_id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to append message", e),
        })
    }

    async fn messages(&self, id: ConversationId) -> AppResult<Vec<Message>> {
        if !self.exists(id).await? {
            return Err(AppError::not_found(format!("Conversation {id} not found")));
        }

        sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE conversation_id = $1 ORDER BY seq ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load messages", e))
    }
}
