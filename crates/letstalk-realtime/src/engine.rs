//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::info;

use letstalk_core::config::realtime::RealtimeConfig;
use letstalk_core::error::AppError;
use letstalk_core::types::id::UserId;
use letstalk_database::store::{ConversationStore, FriendRequestStore, UserStore};
use letstalk_service::conversation::ConversationService;
use letstalk_service::friend::FriendService;

use crate::connection::handle::ConnectionHandle;
use crate::connection::session::SessionContext;
use crate::event::ServerEvent;
use crate::presence::registry::PresenceRegistry;
use crate::router::EventRouter;

/// Central real-time engine that coordinates presence and routing.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Presence registry.
    pub presence: Arc<PresenceRegistry>,
    /// Event router.
    pub router: Arc<EventRouter>,
    /// Configuration.
    config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine over the store traits.
    pub fn new(
        config: RealtimeConfig,
        users: Arc<dyn UserStore>,
        requests: Arc<dyn FriendRequestStore>,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let presence = Arc::new(PresenceRegistry::new(users.clone()));
        let friends = FriendService::new(requests);
        let conversation_service =
            ConversationService::new(users, conversations, config.max_conflict_retries);
        let router = Arc::new(EventRouter::new(
            presence.clone(),
            friends,
            conversation_service,
        ));

        info!("Real-time engine initialized");

        Self {
            presence,
            router,
            config,
            shutdown_tx,
        }
    }

    /// Open a session for a (possibly anonymous) connection.
    ///
    /// Returns the per-connection context and the receiver of outbound
    /// events the transport task forwards onto the socket. The caller
    /// still runs `router.on_connect` once the transport is established.
    pub fn open_session(
        &self,
        user_id: Option<UserId>,
    ) -> (SessionContext, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(user_id, tx));
        (SessionContext::new(handle), rx)
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        Ok(())
    }
}
