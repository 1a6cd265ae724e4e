//! Conversation orchestration: lazy creation, history, append.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use letstalk_core::AppResult;
use letstalk_core::error::AppError;
use letstalk_core::types::id::{ConversationId, UserId};
use letstalk_database::store::{ConversationStore, UserStore};
use letstalk_entity::conversation::Conversation;
use letstalk_entity::message::{Message, MessageKind, NewMessage};
use letstalk_entity::user::UserProfile;

use crate::retry::with_conflict_retries;

use super::view::ConversationView;

/// Owns the pair→conversation mapping and the per-conversation message log.
#[derive(Clone)]
pub struct ConversationService {
    /// User store, for resolving participant display fields.
    users: Arc<dyn UserStore>,
    /// Conversation store.
    conversations: Arc<dyn ConversationStore>,
    /// Bounded attempts for idempotent-create races.
    max_conflict_retries: u32,
}

impl ConversationService {
    /// Creates a new conversation service.
    pub fn new(
        users: Arc<dyn UserStore>,
        conversations: Arc<dyn ConversationStore>,
        max_conflict_retries: u32,
    ) -> Self {
        Self {
            users,
            conversations,
            max_conflict_retries,
        }
    }

    /// Find or lazily create the conversation between two users.
    ///
    /// Idempotent under concurrent calls for the same pair; a lost create
    /// race is retried internally. The flag reports whether the
    /// conversation is new.
    pub async fn open(&self, from: UserId, to: UserId) -> AppResult<(ConversationView, bool)> {
        if from == to {
            return Err(AppError::validation(
                "A conversation needs two distinct participants",
            ));
        }

        let (conversation, created) =
            with_conflict_retries(self.max_conflict_retries, || {
                self.conversations.find_or_create(from, to)
            })
            .await?;

        if created {
            info!(conversation_id = %conversation.id, "Conversation created");
        }

        let view = self.resolve(&conversation).await?;
        Ok((view, created))
    }

    /// All conversations a user participates in, with participants resolved
    /// to display fields.
    pub async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<ConversationView>> {
        let conversations = self.conversations.list_for_user(user_id).await?;

        let mut participant_ids: Vec<UserId> = conversations
            .iter()
            .flat_map(|c| c.participants())
            .collect();
        participant_ids.sort();
        participant_ids.dedup();

        let profiles: HashMap<UserId, UserProfile> = self
            .users
            .find_by_ids(&participant_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.profile()))
            .collect();

        Ok(conversations
            .iter()
            .map(|c| Self::project(c, &profiles))
            .collect())
    }

    /// The ordered message log of a conversation.
    pub async fn messages(&self, conversation_id: ConversationId) -> AppResult<Vec<Message>> {
        self.conversations.messages(conversation_id).await
    }

    /// Append a message to a conversation's log; insertion order is the
    /// single ordering authority.
    pub async fn append(
        &self,
        conversation_id: ConversationId,
        sender_id: UserId,
        recipient_id: UserId,
        kind: MessageKind,
        body: String,
    ) -> AppResult<Message> {
        self.conversations
            .append_message(&NewMessage {
                conversation_id,
                sender_id,
                recipient_id,
                kind,
                body,
            })
            .await
    }

    async fn resolve(&self, conversation: &Conversation) -> AppResult<ConversationView> {
        let profiles: HashMap<UserId, UserProfile> = self
            .users
            .find_by_ids(&conversation.participants())
            .await?
            .into_iter()
            .map(|u| (u.id, u.profile()))
            .collect();

        Ok(Self::project(conversation, &profiles))
    }

    fn project(
        conversation: &Conversation,
        profiles: &HashMap<UserId, UserProfile>,
    ) -> ConversationView {
        ConversationView {
            id: conversation.id,
            participants: conversation
                .participants()
                .iter()
                .filter_map(|id| profiles.get(id).cloned())
                .collect(),
            created_at: conversation.created_at,
        }
    }
}
