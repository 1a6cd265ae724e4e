//! Friend request state machine: none → pending → resolved.
//!
//! A pending request is deleted on acceptance, collapsing into the
//! symmetric friendship relation; there is no rejected state. Duplicate
//! pending requests for the same ordered (sender, receiver) pair are
//! rejected at the store.

use std::sync::Arc;

use tracing::info;

use letstalk_core::AppResult;
use letstalk_core::error::AppError;
use letstalk_core::types::id::{FriendRequestId, UserId};
use letstalk_database::store::FriendRequestStore;
use letstalk_entity::friend_request::{FriendRequest, NewFriendRequest};

/// Mediates the friend-request lifecycle between user pairs.
#[derive(Clone)]
pub struct FriendService {
    /// Pending request store.
    requests: Arc<dyn FriendRequestStore>,
}

impl FriendService {
    /// Creates a new friend service.
    pub fn new(requests: Arc<dyn FriendRequestStore>) -> Self {
        Self { requests }
    }

    /// Create a pending request from `from` to `to`.
    ///
    /// Self-targeted requests are invalid; a duplicate pending request for
    /// the same ordered pair fails with `Conflict`.
    pub async fn send(&self, from: UserId, to: UserId) -> AppResult<FriendRequest> {
        if from == to {
            return Err(AppError::validation(
                "Cannot send a friend request to yourself",
            ));
        }

        let request = self
            .requests
            .create(&NewFriendRequest {
                sender_id: from,
                receiver_id: to,
            })
            .await?;

        info!(
            request_id = %request.id,
            sender = %from,
            receiver = %to,
            "Friend request created"
        );
        Ok(request)
    }

    /// Accept a pending request: the request is deleted and both friend
    /// sets are updated as one atomic unit. Fails with `NotFound` when the
    /// request no longer exists (e.g. a concurrent accept raced this one),
    /// leaving the friend sets unchanged.
    pub async fn accept(&self, request_id: FriendRequestId) -> AppResult<FriendRequest> {
        let request = self
            .requests
            .resolve_accept(request_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Friend request {request_id} not found"))
            })?;

        info!(
            request_id = %request.id,
            sender = %request.sender_id,
            receiver = %request.receiver_id,
            "Friend request accepted"
        );
        Ok(request)
    }

    /// All requests currently pending for a receiver.
    pub async fn pending_for(&self, user_id: UserId) -> AppResult<Vec<FriendRequest>> {
        self.requests.find_by_receiver(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letstalk_core::ErrorKind;
    use letstalk_database::MemoryStore;
    use letstalk_entity::user::NewUser;

    async fn setup() -> (FriendService, Arc<MemoryStore>, UserId, UserId) {
        let store = Arc::new(MemoryStore::new());
        let service = FriendService::new(store.clone());
        let a = seed_user(&store, "ann").await;
        let b = seed_user(&store, "bob").await;
        (service, store, a, b)
    }

    async fn seed_user(store: &Arc<MemoryStore>, name: &str) -> UserId {
        use letstalk_database::store::UserStore;
        UserStore::create(
            store.as_ref(),
            &NewUser {
                first_name: name.to_string(),
                last_name: "Tester".to_string(),
                email: format!("{name}@example.com"),
                verified: true,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_send_then_accept_yields_symmetric_friendship() {
        use letstalk_database::store::UserStore;
        let (service, store, a, b) = setup().await;

        let request = service.send(a, b).await.unwrap();
        let resolved = service.accept(request.id).await.unwrap();

        assert_eq!(resolved.sender_id, a);
        assert_eq!(resolved.receiver_id, b);
        assert!(store.are_friends(a, b).await.unwrap());
        assert!(store.are_friends(b, a).await.unwrap());
        assert!(service.pending_for(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_self_request_is_invalid() {
        let (service, _, a, _) = setup().await;
        let err = service.send(a, a).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_accept_missing_request_is_not_found() {
        use letstalk_database::store::UserStore;
        let (service, store, a, b) = setup().await;

        let err = service.accept(FriendRequestId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(!store.are_friends(a, b).await.unwrap());
    }

    #[tokio::test]
    async fn test_second_accept_races_to_not_found() {
        let (service, _, a, b) = setup().await;

        let request = service.send(a, b).await.unwrap();
        service.accept(request.id).await.unwrap();

        let err = service.accept(request.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_send_conflicts() {
        let (service, _, a, b) = setup().await;

        service.send(a, b).await.unwrap();
        let err = service.send(a, b).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }
}
