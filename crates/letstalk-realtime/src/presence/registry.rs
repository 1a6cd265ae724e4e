//! Presence registry — maps a user to their currently attached live
//! connection and mirrors the state onto the persisted user record.
//!
//! The registry is the single owner of the user record's status and
//! connection fields. Handles are process-local: on restart all presence
//! is rebuilt from new connect events, and stale persisted state is wiped
//! by the startup reset (see `UserStore::reset_presence`).

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use letstalk_core::AppResult;
use letstalk_core::types::id::{ConnectionId, UserId};
use letstalk_database::store::UserStore;
use letstalk_entity::user::PresenceStatus;

use crate::connection::handle::ConnectionHandle;

/// Tracks which users currently have a live connection.
pub struct PresenceRegistry {
    /// User ID → live connection handle. One connection per user,
    /// last-write-wins on reconnect.
    connections: DashMap<UserId, Arc<ConnectionHandle>>,
    /// User store, for mirroring status onto the persisted record.
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for PresenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceRegistry")
            .field("online", &self.connections.len())
            .finish()
    }
}

impl PresenceRegistry {
    /// Create a new empty registry.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            connections: DashMap::new(),
            users,
        }
    }

    /// Record a connection as the live handle for its user and mark the
    /// user online. An anonymous connection (no authenticated identity) is
    /// tolerated but untracked. A previous handle for the same user is
    /// superseded (last-write-wins).
    pub async fn connect(&self, handle: Arc<ConnectionHandle>) -> AppResult<()> {
        let Some(user_id) = handle.user_id else {
            return Ok(());
        };

        let connection_id = handle.id;
        if let Some(previous) = self.connections.insert(user_id, handle) {
            previous.mark_dead();
        }

        self.users
            .set_presence(user_id, PresenceStatus::Online, Some(connection_id))
            .await?;

        info!(user_id = %user_id, conn_id = %connection_id, "User connected");
        Ok(())
    }

    /// Clear the live handle and mark the user offline.
    ///
    /// Idempotent, and guarded by the connection id: a late disconnect
    /// from a superseded connection must not evict the replacement or
    /// flip a reconnected user back to offline.
    pub async fn disconnect(&self, user_id: UserId, connection_id: ConnectionId) -> AppResult<()> {
        let removed = self
            .connections
            .remove_if(&user_id, |_, handle| handle.id == connection_id);

        let Some((_, handle)) = removed else {
            return Ok(());
        };
        handle.mark_dead();

        self.users
            .set_presence(user_id, PresenceStatus::Offline, None)
            .await?;

        info!(user_id = %user_id, conn_id = %connection_id, "User disconnected");
        Ok(())
    }

    /// The live connection for a user, if any. `None` means any emit
    /// targeting the user is silently skipped.
    pub fn lookup(&self, user_id: UserId) -> Option<Arc<ConnectionHandle>> {
        self.connections
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .filter(|handle| handle.is_alive())
    }

    /// Whether a user currently has a live connection.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.lookup(user_id).is_some()
    }

    /// Number of users with a live connection.
    pub fn online_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letstalk_database::MemoryStore;
    use letstalk_entity::user::NewUser;
    use tokio::sync::mpsc;

    async fn setup() -> (PresenceRegistry, Arc<MemoryStore>, UserId) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create(&NewUser {
                first_name: "Ann".to_string(),
                last_name: "Tester".to_string(),
                email: "ann@example.com".to_string(),
                verified: true,
            })
            .await
            .unwrap();
        let registry = PresenceRegistry::new(store.clone());
        (registry, store, user.id)
    }

    fn handle_for(user_id: Option<UserId>) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(8);
        Arc::new(ConnectionHandle::new(user_id, tx))
    }

    #[tokio::test]
    async fn test_connect_then_lookup_then_disconnect() {
        let (registry, store, user_id) = setup().await;
        let handle = handle_for(Some(user_id));

        registry.connect(handle.clone()).await.unwrap();
        assert!(registry.is_online(user_id));
        assert_eq!(
            store.find_by_id(user_id).await.unwrap().unwrap().status,
            PresenceStatus::Online
        );

        registry.disconnect(user_id, handle.id).await.unwrap();
        assert!(registry.lookup(user_id).is_none());
        let record = store.find_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(record.status, PresenceStatus::Offline);
        assert!(record.socket_id.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (registry, _, user_id) = setup().await;
        let handle = handle_for(Some(user_id));

        registry.connect(handle.clone()).await.unwrap();
        registry.disconnect(user_id, handle.id).await.unwrap();
        // Second disconnect of an already-offline user is a no-op.
        registry.disconnect(user_id, handle.id).await.unwrap();
        assert!(!registry.is_online(user_id));
    }

    #[tokio::test]
    async fn test_anonymous_connection_is_untracked() {
        let (registry, _, _) = setup().await;
        let handle = handle_for(None);

        registry.connect(handle).await.unwrap();
        assert_eq!(registry.online_count(), 0);
    }

    #[tokio::test]
    async fn test_reconnect_supersedes_and_guards_stale_disconnect() {
        let (registry, store, user_id) = setup().await;
        let first = handle_for(Some(user_id));
        let second = handle_for(Some(user_id));

        registry.connect(first.clone()).await.unwrap();
        registry.connect(second.clone()).await.unwrap();
        assert!(!first.is_alive());

        // The superseded connection's late teardown must not evict the
        // replacement.
        registry.disconnect(user_id, first.id).await.unwrap();
        assert!(registry.is_online(user_id));
        assert_eq!(registry.lookup(user_id).unwrap().id, second.id);
        assert_eq!(
            store.find_by_id(user_id).await.unwrap().unwrap().status,
            PresenceStatus::Online
        );
    }
}
