//! Single in-memory store implementing all three store traits.
//!
//! All state sits behind one mutex, so every operation — including the
//! two-record friend-request acceptance — is atomic. The critical
//! sections never await, which keeps the lock safe to take from async
//! context. Used by the integration tests and as the reference model of
//! the store contract.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use letstalk_core::AppResult;
use letstalk_core::error::AppError;
use letstalk_core::types::id::{
    ConnectionId, ConversationId, FriendRequestId, MessageId, UserId,
};
use letstalk_entity::conversation::Conversation;
use letstalk_entity::friend_request::{FriendRequest, NewFriendRequest};
use letstalk_entity::message::{Message, NewMessage};
use letstalk_entity::user::{NewUser, PresenceStatus, User};

use crate::store::{ConversationStore, FriendRequestStore, UserStore};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    friendships: HashMap<UserId, HashSet<UserId>>,
    requests: HashMap<FriendRequestId, FriendRequest>,
    conversations: HashMap<ConversationId, Conversation>,
    pair_index: HashMap<(UserId, UserId), ConversationId>,
    messages: HashMap<ConversationId, Vec<Message>>,
    next_seq: i64,
}

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panicked test thread; propagating the
        // panic is the right outcome there.
        self.inner.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, data: &NewUser) -> AppResult<User> {
        let mut inner = self.lock();
        let email = data.email.to_lowercase();
        if inner.users.values().any(|u| u.email == email) {
            return Err(AppError::conflict(format!(
                "Email '{email}' already in use"
            )));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            email,
            verified: data.verified,
            status: PresenceStatus::Offline,
            socket_id: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        let inner = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn find_verified(&self) -> AppResult<Vec<User>> {
        let inner = self.lock();
        let mut users: Vec<User> = inner.users.values().filter(|u| u.verified).cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn set_presence(
        &self,
        id: UserId,
        status: PresenceStatus,
        socket_id: Option<ConnectionId>,
    ) -> AppResult<()> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.status = status;
        user.socket_id = socket_id;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn reset_presence(&self) -> AppResult<u64> {
        let mut inner = self.lock();
        let mut touched = 0;
        for user in inner.users.values_mut() {
            if user.status != PresenceStatus::Offline || user.socket_id.is_some() {
                user.status = PresenceStatus::Offline;
                user.socket_id = None;
                user.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn friend_ids(&self, id: UserId) -> AppResult<Vec<UserId>> {
        let inner = self.lock();
        let mut ids: Vec<UserId> = inner
            .friendships
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }

    async fn are_friends(&self, a: UserId, b: UserId) -> AppResult<bool> {
        let inner = self.lock();
        Ok(inner
            .friendships
            .get(&a)
            .is_some_and(|set| set.contains(&b)))
    }
}

#[async_trait]
impl FriendRequestStore for MemoryStore {
    async fn create(&self, data: &NewFriendRequest) -> AppResult<FriendRequest> {
        let mut inner = self.lock();
        if !inner.users.contains_key(&data.sender_id) || !inner.users.contains_key(&data.receiver_id)
        {
            return Err(AppError::not_found("Sender or receiver does not exist"));
        }
        if inner
            .requests
            .values()
            .any(|r| r.sender_id == data.sender_id && r.receiver_id == data.receiver_id)
        {
            return Err(AppError::conflict(
                "A request for this pair is already pending",
            ));
        }

        let request = FriendRequest {
            id: FriendRequestId::new(),
            sender_id: data.sender_id,
            receiver_id: data.receiver_id,
            created_at: Utc::now(),
        };
        inner.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: FriendRequestId) -> AppResult<Option<FriendRequest>> {
        Ok(self.lock().requests.get(&id).cloned())
    }

    async fn find_by_receiver(&self, receiver: UserId) -> AppResult<Vec<FriendRequest>> {
        let inner = self.lock();
        let mut requests: Vec<FriendRequest> = inner
            .requests
            .values()
            .filter(|r| r.receiver_id == receiver)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn resolve_accept(&self, id: FriendRequestId) -> AppResult<Option<FriendRequest>> {
        let mut inner = self.lock();
        let Some(request) = inner.requests.remove(&id) else {
            return Ok(None);
        };

        inner
            .friendships
            .entry(request.sender_id)
            .or_default()
            .insert(request.receiver_id);
        inner
            .friendships
            .entry(request.receiver_id)
            .or_default()
            .insert(request.sender_id);

        Ok(Some(request))
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn find_or_create(&self, x: UserId, y: UserId) -> AppResult<(Conversation, bool)> {
        let mut inner = self.lock();
        let pair = Conversation::normalize_pair(x, y);

        if let Some(id) = inner.pair_index.get(&pair) {
            let conversation = inner.conversations[id].clone();
            return Ok((conversation, false));
        }

        let conversation = Conversation {
            id: ConversationId::new(),
            participant_a: pair.0,
            participant_b: pair.1,
            created_at: Utc::now(),
        };
        inner.pair_index.insert(pair, conversation.id);
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        inner.messages.insert(conversation.id, Vec::new());
        Ok((conversation, true))
    }

    async fn find_by_id(&self, id: ConversationId) -> AppResult<Option<Conversation>> {
        Ok(self.lock().conversations.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Conversation>> {
        let inner = self.lock();
        let mut conversations: Vec<Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.involves(user_id))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(conversations)
    }

    async fn append_message(&self, data: &NewMessage) -> AppResult<Message> {
        let mut inner = self.lock();
        if !inner.conversations.contains_key(&data.conversation_id) {
            return Err(AppError::not_found(format!(
                "Conversation {} not found",
                data.conversation_id
            )));
        }

        inner.next_seq += 1;
        let message = Message {
            id: MessageId::new(),
            conversation_id: data.conversation_id,
            sender_id: data.sender_id,
            recipient_id: data.recipient_id,
            kind: data.kind,
            body: data.body.clone(),
            seq: inner.next_seq,
            created_at: Utc::now(),
        };
        inner
            .messages
            .entry(data.conversation_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn messages(&self, id: ConversationId) -> AppResult<Vec<Message>> {
        let inner = self.lock();
        if !inner.conversations.contains_key(&id) {
            return Err(AppError::not_found(format!("Conversation {id} not found")));
        }
        Ok(inner.messages.get(&id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letstalk_core::ErrorKind;
    use letstalk_entity::message::MessageKind;

    async fn seed_user(store: &MemoryStore, first: &str) -> User {
        UserStore::create(
            store,
            &NewUser {
                first_name: first.to_string(),
                last_name: "Tester".to_string(),
                email: format!("{}@example.com", first.to_lowercase()),
                verified: true,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "Ann").await;
        let b = seed_user(&store, "Bob").await;

        let (c1, created1) = store.find_or_create(a.id, b.id).await.unwrap();
        let (c2, created2) = store.find_or_create(b.id, a.id).await.unwrap();

        assert!(created1);
        assert!(!created2);
        assert_eq!(c1.id, c2.id);
        assert_eq!(store.list_for_user(a.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_preserves_insertion_order() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "Ann").await;
        let b = seed_user(&store, "Bob").await;
        let (convo, _) = store.find_or_create(a.id, b.id).await.unwrap();

        for body in ["first", "second", "third"] {
            store
                .append_message(&NewMessage {
                    conversation_id: convo.id,
                    sender_id: a.id,
                    recipient_id: b.id,
                    kind: MessageKind::Text,
                    body: body.to_string(),
                })
                .await
                .unwrap();
        }

        let log = store.messages(convo.id).await.unwrap();
        let bodies: Vec<&str> = log.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second", "third"]);
        assert!(log.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    #[tokio::test]
    async fn test_messages_for_unknown_conversation_is_not_found() {
        let store = MemoryStore::new();
        let err = store.messages(ConversationId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_accept_records_symmetric_friendship() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "Ann").await;
        let b = seed_user(&store, "Bob").await;

        let request = FriendRequestStore::create(
            &store,
            &NewFriendRequest {
                sender_id: a.id,
                receiver_id: b.id,
            },
        )
        .await
        .unwrap();

        let resolved = store.resolve_accept(request.id).await.unwrap();
        assert_eq!(resolved.unwrap().id, request.id);
        assert!(store.are_friends(a.id, b.id).await.unwrap());
        assert!(store.are_friends(b.id, a.id).await.unwrap());
        assert!(
            FriendRequestStore::find_by_id(&store, request.id)
                .await
                .unwrap()
                .is_none()
        );

        // Second accept of the same request: gone, friend sets untouched.
        assert!(store.resolve_accept(request.id).await.unwrap().is_none());
        assert!(store.are_friends(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_pending_request_conflicts() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "Ann").await;
        let b = seed_user(&store, "Bob").await;
        let data = NewFriendRequest {
            sender_id: a.id,
            receiver_id: b.id,
        };

        FriendRequestStore::create(&store, &data).await.unwrap();
        let err = FriendRequestStore::create(&store, &data).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        // The reverse direction is a different ordered pair and is allowed.
        FriendRequestStore::create(
            &store,
            &NewFriendRequest {
                sender_id: b.id,
                receiver_id: a.id,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_reset_presence_clears_stale_records() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "Ann").await;
        store
            .set_presence(a.id, PresenceStatus::Online, Some(ConnectionId::new()))
            .await
            .unwrap();

        assert_eq!(store.reset_presence().await.unwrap(), 1);
        let user = UserStore::find_by_id(&store, a.id).await.unwrap().unwrap();
        assert_eq!(user.status, PresenceStatus::Offline);
        assert!(user.socket_id.is_none());

        // Idempotent: nothing left to touch.
        assert_eq!(store.reset_presence().await.unwrap(), 0);
    }
}
