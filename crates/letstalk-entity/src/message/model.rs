//! Message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use letstalk_core::types::id::{ConversationId, MessageId, UserId};

use super::kind::MessageKind;

/// A message in a conversation's append-only log.
///
/// Messages are never edited or removed. `seq` is assigned at append time
/// and is the single ordering authority within a conversation; `created_at`
/// is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// User who sent the message.
    pub sender_id: UserId,
    /// User the message is addressed to.
    pub recipient_id: UserId,
    /// Payload kind.
    pub kind: MessageKind,
    /// Payload body (text, or an opaque document reference).
    pub body: String,
    /// Append-order sequence number.
    pub seq: i64,
    /// When the message was appended.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a message to a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    /// Target conversation.
    pub conversation_id: ConversationId,
    /// Sending user.
    pub sender_id: UserId,
    /// Receiving user.
    pub recipient_id: UserId,
    /// Payload kind.
    pub kind: MessageKind,
    /// Payload body.
    pub body: String,
}
