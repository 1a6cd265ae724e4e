//! Individual live connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use letstalk_core::types::id::{ConnectionId, UserId};

use crate::event::ServerEvent;

/// A handle to a single live connection.
///
/// Holds the sender half of the bounded outbound channel; the transport
/// task owns the receiver and forwards events onto the socket. The handle
/// is ephemeral and process-local — nothing here survives a restart.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID, minted on connect.
    pub id: ConnectionId,
    /// Authenticated user, if the session presented a valid token.
    /// Anonymous connections are served but never tracked by presence.
    pub user_id: Option<UserId>,
    /// Sender for outbound events.
    sender: mpsc::Sender<ServerEvent>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(user_id: Option<UserId>, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: ConnectionId::new(),
            user_id,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Push an event to this connection. Returns whether it was enqueued.
    ///
    /// A full buffer drops the event (slow consumer; the log is the
    /// recovery path), a closed channel marks the connection dead.
    pub fn send(&self, event: ServerEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
