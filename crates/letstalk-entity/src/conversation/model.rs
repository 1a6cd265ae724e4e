//! Direct (1:1) conversation model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use letstalk_core::types::id::{ConversationId, UserId};

/// A persistent conversation between exactly two distinct participants.
///
/// The pair is stored normalized (`participant_a < participant_b`) so that
/// the unordered pair has exactly one representation; a uniqueness
/// constraint on the normalized pair makes creation idempotent.
/// Conversations are created lazily and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// Lower participant of the normalized pair.
    pub participant_a: UserId,
    /// Higher participant of the normalized pair.
    pub participant_b: UserId,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Normalize an unordered participant pair to its canonical (lo, hi) form.
    pub fn normalize_pair(x: UserId, y: UserId) -> (UserId, UserId) {
        if x <= y { (x, y) } else { (y, x) }
    }

    /// Both participants.
    pub fn participants(&self) -> [UserId; 2] {
        [self.participant_a, self.participant_b]
    }

    /// Check if a user is a participant.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    /// The participant that is not `user_id`, if `user_id` is a participant.
    pub fn other_participant(&self, user_id: UserId) -> Option<UserId> {
        if self.participant_a == user_id {
            Some(self.participant_b)
        } else if self.participant_b == user_id {
            Some(self.participant_a)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pair_is_order_insensitive() {
        let x = UserId::new();
        let y = UserId::new();
        assert_eq!(
            Conversation::normalize_pair(x, y),
            Conversation::normalize_pair(y, x)
        );
        let (lo, hi) = Conversation::normalize_pair(x, y);
        assert!(lo <= hi);
    }

    #[test]
    fn test_participant_queries() {
        let x = UserId::new();
        let y = UserId::new();
        let (lo, hi) = Conversation::normalize_pair(x, y);
        let convo = Conversation {
            id: ConversationId::new(),
            participant_a: lo,
            participant_b: hi,
            created_at: Utc::now(),
        };
        assert!(convo.involves(x));
        assert!(convo.involves(y));
        assert_eq!(convo.other_participant(x), Some(y));
        assert_eq!(convo.other_participant(UserId::new()), None);
    }
}
