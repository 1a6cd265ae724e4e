//! Per-connection session context.

use std::sync::Arc;

use letstalk_core::types::id::{ConnectionId, UserId};

use super::handle::ConnectionHandle;

/// Explicit context for one live connection, passed into every handler —
/// never ambient or global. Carries the connection handle (for direct
/// replies) and the session's authenticated identity.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// The connection this session runs on.
    pub handle: Arc<ConnectionHandle>,
}

impl SessionContext {
    /// Create a context for a connection.
    pub fn new(handle: Arc<ConnectionHandle>) -> Self {
        Self { handle }
    }

    /// The connection id.
    pub fn connection_id(&self) -> ConnectionId {
        self.handle.id
    }

    /// The authenticated user, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.handle.user_id
    }
}
