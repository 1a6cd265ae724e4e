//! Roster reads: discoverable users, friends, pending requests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use letstalk_core::AppResult;
use letstalk_core::types::id::{FriendRequestId, UserId};
use letstalk_database::store::{FriendRequestStore, UserStore};
use letstalk_entity::user::UserProfile;

use crate::context::RequestContext;

/// A pending friend request with its sender resolved to display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequestView {
    /// Request identifier.
    pub id: FriendRequestId,
    /// Sender display fields.
    pub sender: UserProfile,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

/// Serves the read-side lists a client renders around the chat screen.
#[derive(Clone)]
pub struct RosterService {
    /// User store.
    users: Arc<dyn UserStore>,
    /// Pending request store.
    requests: Arc<dyn FriendRequestStore>,
}

impl RosterService {
    /// Creates a new roster service.
    pub fn new(users: Arc<dyn UserStore>, requests: Arc<dyn FriendRequestStore>) -> Self {
        Self { users, requests }
    }

    /// Verified users the caller could befriend: everyone verified except
    /// the caller and their existing friends.
    pub async fn discoverable_users(&self, ctx: &RequestContext) -> AppResult<Vec<UserProfile>> {
        let friends: HashSet<UserId> = self
            .users
            .friend_ids(ctx.user_id)
            .await?
            .into_iter()
            .collect();

        Ok(self
            .users
            .find_verified()
            .await?
            .into_iter()
            .filter(|u| u.id != ctx.user_id && !friends.contains(&u.id))
            .map(|u| u.profile())
            .collect())
    }

    /// The caller's friends, with display fields.
    pub async fn friends(&self, ctx: &RequestContext) -> AppResult<Vec<UserProfile>> {
        let ids = self.users.friend_ids(ctx.user_id).await?;
        Ok(self
            .users
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| u.profile())
            .collect())
    }

    /// Requests pending for the caller, with the sender resolved. This is
    /// what a reconnecting user reads to catch up on requests that arrived
    /// while they were offline.
    pub async fn pending_requests(&self, ctx: &RequestContext) -> AppResult<Vec<FriendRequestView>> {
        let requests = self.requests.find_by_receiver(ctx.user_id).await?;

        let sender_ids: Vec<UserId> = requests.iter().map(|r| r.sender_id).collect();
        let senders: HashMap<UserId, UserProfile> = self
            .users
            .find_by_ids(&sender_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.profile()))
            .collect();

        Ok(requests
            .into_iter()
            .filter_map(|r| {
                senders.get(&r.sender_id).cloned().map(|sender| FriendRequestView {
                    id: r.id,
                    sender,
                    created_at: r.created_at,
                })
            })
            .collect())
    }
}
