//! Read-side projection of a conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use letstalk_core::types::id::ConversationId;
use letstalk_entity::user::UserProfile;

/// A conversation with its participants resolved to display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationView {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Resolved participants (display fields only).
    pub participants: Vec<UserProfile>,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
}
