//! Store traits — the seam between the chat engine and the external
//! document store.
//!
//! One trait per record family (users, friend requests, conversations).
//! Every shared mutation the engine performs goes through these traits, so
//! the serialization guarantees live in the implementations: PostgreSQL
//! uses transactions and conditional writes, the in-memory store a single
//! mutex. Implementations signal a lost write race with
//! [`ErrorKind::Conflict`](letstalk_core::ErrorKind::Conflict); callers
//! retry with bounded attempts.

use async_trait::async_trait;

use letstalk_core::AppResult;
use letstalk_core::types::id::{ConnectionId, ConversationId, FriendRequestId, UserId};
use letstalk_entity::conversation::Conversation;
use letstalk_entity::friend_request::{FriendRequest, NewFriendRequest};
use letstalk_entity::message::{Message, NewMessage};
use letstalk_entity::user::{NewUser, PresenceStatus, User};

/// Access to persisted user records and the symmetric friendship relation.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user record. Fails with `Conflict` when the email is
    /// already taken.
    async fn create(&self, data: &NewUser) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find several users at once; missing ids are silently absent from
    /// the result.
    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>>;

    /// All verified users.
    async fn find_verified(&self) -> AppResult<Vec<User>>;

    /// Mirror presence onto the persisted record (status + live connection
    /// id). Last-write-wins per user. Fails with `NotFound` for an unknown
    /// user.
    async fn set_presence(
        &self,
        id: UserId,
        status: PresenceStatus,
        socket_id: Option<ConnectionId>,
    ) -> AppResult<()>;

    /// Reset every user to offline and clear connection ids. Run at
    /// startup: records claiming `online` after a crash are stale.
    /// Returns the number of records touched.
    async fn reset_presence(&self) -> AppResult<u64>;

    /// Ids of all friends of a user.
    async fn friend_ids(&self, id: UserId) -> AppResult<Vec<UserId>>;

    /// Whether two users are friends. Symmetric by construction.
    async fn are_friends(&self, a: UserId, b: UserId) -> AppResult<bool>;
}

/// Access to pending friend requests and their resolution.
#[async_trait]
pub trait FriendRequestStore: Send + Sync {
    /// Create a pending request. Fails with `Conflict` when a request for
    /// the same ordered (sender, receiver) pair is already pending, and
    /// with `NotFound` when either user does not exist.
    async fn create(&self, data: &NewFriendRequest) -> AppResult<FriendRequest>;

    /// Find a pending request by id.
    async fn find_by_id(&self, id: FriendRequestId) -> AppResult<Option<FriendRequest>>;

    /// All pending requests addressed to a user.
    async fn find_by_receiver(&self, receiver: UserId) -> AppResult<Vec<FriendRequest>>;

    /// Atomically delete the pending request and record the symmetric
    /// friendship (both directions). Returns the deleted request, or
    /// `None` when it no longer exists (e.g. a racing accept already won) —
    /// in which case the friend sets are left untouched. No partially
    /// applied outcome is observable.
    async fn resolve_accept(&self, id: FriendRequestId) -> AppResult<Option<FriendRequest>>;
}

/// Access to direct conversations and their append-only message logs.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Find the conversation for the unordered pair {x, y}, creating it if
    /// absent. Idempotent under concurrent calls for the same pair: at
    /// most one conversation per pair ever exists. The flag reports
    /// whether this call created it.
    async fn find_or_create(&self, x: UserId, y: UserId) -> AppResult<(Conversation, bool)>;

    /// Find a conversation by id.
    async fn find_by_id(&self, id: ConversationId) -> AppResult<Option<Conversation>>;

    /// All conversations a user participates in.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Conversation>>;

    /// Append a message to a conversation's log. Insertion order is the
    /// single ordering authority. Fails with `NotFound` for an unknown
    /// conversation.
    async fn append_message(&self, data: &NewMessage) -> AppResult<Message>;

    /// The ordered message log of a conversation. Fails with `NotFound`
    /// for an unknown conversation.
    async fn messages(&self, id: ConversationId) -> AppResult<Vec<Message>>;
}
