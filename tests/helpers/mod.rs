//! Shared test helpers: the realtime engine over the in-memory store,
//! with channel-backed connections standing in for sockets.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use letstalk_core::config::realtime::RealtimeConfig;
use letstalk_core::types::id::UserId;
use letstalk_database::MemoryStore;
use letstalk_database::store::UserStore;
use letstalk_entity::user::{NewUser, User};
use letstalk_realtime::{RealtimeEngine, ServerEvent, SessionContext};

/// The realtime engine wired to a single in-memory store.
pub struct TestBackend {
    pub store: Arc<MemoryStore>,
    pub engine: RealtimeEngine,
}

impl TestBackend {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let engine = RealtimeEngine::new(
            RealtimeConfig::default(),
            store.clone(),
            store.clone(),
            store.clone(),
        );
        Self { store, engine }
    }

    pub async fn seed_user(&self, first_name: &str) -> User {
        self.store
            .create(&NewUser {
                first_name: first_name.to_string(),
                last_name: "Tester".to_string(),
                email: format!("{}@example.com", first_name.to_lowercase()),
                verified: true,
            })
            .await
            .expect("seed user")
    }

    /// Open a session for a user and register it with the presence
    /// registry, as the socket handler does on upgrade.
    pub async fn connect(&self, user_id: UserId) -> (SessionContext, mpsc::Receiver<ServerEvent>) {
        let (ctx, rx) = self.engine.open_session(Some(user_id));
        self.engine.router.on_connect(&ctx).await;
        (ctx, rx)
    }

    /// Run the transport teardown backstop for a session.
    pub async fn disconnect(&self, ctx: &SessionContext) {
        self.engine.router.on_disconnect(ctx).await;
    }
}

/// Receive the next event, or panic after a short timeout.
pub async fn recv(rx: &mut mpsc::Receiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Assert nothing is waiting on the channel.
pub fn assert_no_event(rx: &mut mpsc::Receiver<ServerEvent>) {
    assert!(
        matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Empty)),
        "expected no pending event"
    );
}
