//! Event router — receives inbound events, delegates to the presence
//! registry and the friend/conversation services, and emits outbound
//! events to zero, one, or two live connections.
//!
//! Emits targeting a user go through the presence registry; a user with
//! no live connection is silently skipped and never fails the triggering
//! operation. Request/reply operations answer on the originating
//! connection. A handler failure never tears down the connection or the
//! process.

use std::sync::Arc;

use tracing::{debug, warn};

use letstalk_core::error::AppError;
use letstalk_core::types::id::UserId;
use letstalk_service::conversation::ConversationService;
use letstalk_service::friend::FriendService;

use crate::connection::session::SessionContext;
use crate::event::{ClientEvent, ServerEvent};
use crate::presence::registry::PresenceRegistry;

/// Routes inbound events to the components and outbound events to live
/// connections.
pub struct EventRouter {
    /// Presence registry: user → live connection.
    presence: Arc<PresenceRegistry>,
    /// Friend request state machine.
    friends: FriendService,
    /// Conversation store orchestration.
    conversations: ConversationService,
}

impl EventRouter {
    /// Creates a new router over the given components.
    pub fn new(
        presence: Arc<PresenceRegistry>,
        friends: FriendService,
        conversations: ConversationService,
    ) -> Self {
        Self {
            presence,
            friends,
            conversations,
        }
    }

    /// Session start: register the connection with the presence registry.
    /// Anonymous sessions stay untracked. A store failure is logged but
    /// does not reject the connection.
    pub async fn on_connect(&self, ctx: &SessionContext) {
        if let Err(e) = self.presence.connect(ctx.handle.clone()).await {
            warn!(conn_id = %ctx.connection_id(), error = %e, "Failed to record presence on connect");
        }
    }

    /// Session teardown backstop: always invoked when the transport drops,
    /// whether or not the client sent an explicit `end`. Idempotent.
    pub async fn on_disconnect(&self, ctx: &SessionContext) {
        let Some(user_id) = ctx.user_id() else {
            return;
        };
        if let Err(e) = self.presence.disconnect(user_id, ctx.connection_id()).await {
            warn!(conn_id = %ctx.connection_id(), error = %e, "Failed to record presence on disconnect");
        }
    }

    /// Handle one raw inbound frame: parse, then dispatch.
    ///
    /// An unrecognized operation is ignored (logged at debug); a malformed
    /// payload of a known operation gets an `error` reply. Neither drops
    /// the connection.
    pub async fn handle_frame(&self, ctx: &SessionContext, raw: &str) {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                debug!(conn_id = %ctx.connection_id(), error = %e, "Dropping non-JSON frame");
                self.reply_error(ctx, &AppError::validation("Malformed frame"));
                return;
            }
        };

        match serde_json::from_value::<ClientEvent>(value.clone()) {
            Ok(event) => self.dispatch(ctx, event).await,
            Err(e) => {
                let tag = value.get("event").and_then(|t| t.as_str()).unwrap_or("");
                if ClientEvent::KNOWN_TAGS.contains(&tag) {
                    self.reply_error(
                        ctx,
                        &AppError::validation(format!("Malformed '{tag}' payload: {e}")),
                    );
                } else {
                    debug!(conn_id = %ctx.connection_id(), tag, "Ignoring unrecognized event");
                }
            }
        }
    }

    /// Dispatch a parsed event. Exhaustive: adding an inbound variant
    /// without a handler is a compile error.
    pub async fn dispatch(&self, ctx: &SessionContext, event: ClientEvent) {
        match event {
            ClientEvent::SendFriendRequest { from, to } => {
                self.on_send_friend_request(ctx, from, to).await;
            }
            ClientEvent::AcceptFriendRequest { request_id } => {
                match self.friends.accept(request_id).await {
                    Ok(request) => {
                        // Each party independently; either may be offline.
                        self.emit_to(
                            request.sender_id,
                            ServerEvent::FriendRequestAccepted {
                                request: request.clone(),
                            },
                        );
                        self.emit_to(
                            request.receiver_id,
                            ServerEvent::FriendRequestAccepted { request },
                        );
                    }
                    Err(e) => {
                        warn!(conn_id = %ctx.connection_id(), request_id = %request_id, error = %e, "Accept failed");
                    }
                }
            }
            ClientEvent::GetDirectConversations { user_id } => {
                match self.conversations.list_for_user(user_id).await {
                    Ok(conversations) => {
                        self.reply(ctx, ServerEvent::Conversations { conversations });
                    }
                    Err(e) => self.reply_error(ctx, &e),
                }
            }
            ClientEvent::StartConversation { from, to } => {
                match self.conversations.open(from, to).await {
                    Ok((conversation, true)) => {
                        self.reply(ctx, ServerEvent::StartChat { conversation });
                    }
                    Ok((conversation, false)) => {
                        self.reply(ctx, ServerEvent::OpenChat { conversation });
                    }
                    Err(e) => self.reply_error(ctx, &e),
                }
            }
            ClientEvent::GetMessages { conversation_id } => {
                match self.conversations.messages(conversation_id).await {
                    Ok(messages) => {
                        self.reply(
                            ctx,
                            ServerEvent::Messages {
                                conversation_id,
                                messages,
                            },
                        );
                    }
                    Err(e) => self.reply_error(ctx, &e),
                }
            }
            ClientEvent::TextMessage {
                from,
                to,
                conversation_id,
                message,
                kind,
            } => {
                match self
                    .conversations
                    .append(conversation_id, from, to, kind, message)
                    .await
                {
                    Ok(message) => {
                        self.emit_to(
                            to,
                            ServerEvent::NewMessage {
                                message: message.clone(),
                            },
                        );
                        self.emit_to(from, ServerEvent::NewMessage { message });
                    }
                    Err(e) => {
                        warn!(conn_id = %ctx.connection_id(), conversation_id = %conversation_id, error = %e, "Append failed");
                    }
                }
            }
            ClientEvent::End { user_id } => {
                // The connection-id guard makes a mismatched payload a
                // no-op for other sessions.
                if let Err(e) = self.presence.disconnect(user_id, ctx.connection_id()).await {
                    warn!(conn_id = %ctx.connection_id(), error = %e, "Failed to record presence on end");
                }
                ctx.handle.mark_dead();
            }
        }
    }

    async fn on_send_friend_request(&self, ctx: &SessionContext, from: UserId, to: UserId) {
        match self.friends.send(from, to).await {
            Ok(request) => {
                // The request is recorded even when the receiver is
                // offline; only the live push is skipped.
                self.emit_to(
                    request.receiver_id,
                    ServerEvent::NewFriendRequest {
                        request: request.clone(),
                    },
                );
                self.emit_to(request.sender_id, ServerEvent::FriendRequestSent { request });
            }
            Err(e) => {
                warn!(conn_id = %ctx.connection_id(), sender = %from, error = %e, "Send friend request failed");
            }
        }
    }

    /// Emit to a user's live connection, silently skipping offline users.
    fn emit_to(&self, user_id: UserId, event: ServerEvent) {
        match self.presence.lookup(user_id) {
            Some(handle) => {
                handle.send(event);
            }
            None => {
                debug!(user_id = %user_id, "No live connection, skipping emit");
            }
        }
    }

    /// Reply on the originating connection.
    fn reply(&self, ctx: &SessionContext, event: ServerEvent) {
        ctx.handle.send(event);
    }

    fn reply_error(&self, ctx: &SessionContext, error: &AppError) {
        self.reply(
            ctx,
            ServerEvent::Error {
                code: error.kind.to_string(),
                message: error.message.clone(),
            },
        );
    }
}
