//! Pending friend request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use letstalk_core::types::id::{FriendRequestId, UserId};

/// A unilateral proposal from one user to another to establish a
/// symmetric friendship.
///
/// At most one pending request exists per ordered (sender, receiver) pair.
/// Acceptance deletes the record; there is no rejected state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FriendRequest {
    /// Unique request identifier.
    pub id: FriendRequestId,
    /// User who sent the request.
    pub sender_id: UserId,
    /// User who received the request.
    pub receiver_id: UserId,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a pending friend request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NewFriendRequest {
    /// Sending user.
    pub sender_id: UserId,
    /// Receiving user.
    pub receiver_id: UserId,
}
