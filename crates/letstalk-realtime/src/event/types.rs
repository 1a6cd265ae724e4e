//! Inbound and outbound event type definitions.
//!
//! The inbound set is a closed enum dispatched by exhaustive matching;
//! there is no string-keyed handler table, so a handler cannot be missing
//! at runtime. Frames are `event`-tagged JSON; the message payload keeps
//! its own `type` field for the kind (text/document).

use serde::{Deserialize, Serialize};

use letstalk_core::types::id::{ConversationId, FriendRequestId, UserId};
use letstalk_entity::friend_request::FriendRequest;
use letstalk_entity::message::{Message, MessageKind};
use letstalk_service::conversation::ConversationView;

/// Events sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Propose a friendship.
    SendFriendRequest {
        /// Sending user.
        from: UserId,
        /// Receiving user.
        to: UserId,
    },
    /// Accept a pending friend request.
    AcceptFriendRequest {
        /// The pending request.
        request_id: FriendRequestId,
    },
    /// Fetch the caller's conversations (direct reply).
    GetDirectConversations {
        /// The user whose conversations to list.
        user_id: UserId,
    },
    /// Find or lazily create the conversation with another user.
    StartConversation {
        /// Requesting user.
        from: UserId,
        /// The other participant.
        to: UserId,
    },
    /// Fetch a conversation's message log (direct reply).
    GetMessages {
        /// The conversation.
        conversation_id: ConversationId,
    },
    /// Append a message to a conversation.
    TextMessage {
        /// Sending user.
        from: UserId,
        /// Receiving user.
        to: UserId,
        /// Target conversation.
        conversation_id: ConversationId,
        /// Payload body.
        message: String,
        /// Payload kind.
        #[serde(rename = "type")]
        kind: MessageKind,
    },
    /// Explicit end of session; the transport teardown backstop covers
    /// clients that never send it.
    End {
        /// The user ending the session.
        user_id: UserId,
    },
}

impl ClientEvent {
    /// Every tag the closed inbound set accepts. Used to distinguish an
    /// unrecognized operation (ignored) from a malformed payload of a
    /// known one (error reply).
    pub const KNOWN_TAGS: &'static [&'static str] = &[
        "send_friend_request",
        "accept_friend_request",
        "get_direct_conversations",
        "start_conversation",
        "get_messages",
        "text_message",
        "end",
    ];
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A friend request arrived for this user.
    NewFriendRequest {
        /// The pending request.
        request: FriendRequest,
    },
    /// Acknowledgement to the sender of a friend request.
    FriendRequestSent {
        /// The pending request.
        request: FriendRequest,
    },
    /// A friend request was accepted; delivered to both parties.
    FriendRequestAccepted {
        /// The resolved request.
        request: FriendRequest,
    },
    /// A message was appended to a conversation this user is part of.
    NewMessage {
        /// The appended message.
        message: Message,
    },
    /// Reply to `start_conversation`: the conversation was just created.
    StartChat {
        /// The new conversation.
        conversation: ConversationView,
    },
    /// Reply to `start_conversation`: the conversation already existed.
    OpenChat {
        /// The existing conversation.
        conversation: ConversationView,
    },
    /// Reply to `get_direct_conversations`.
    Conversations {
        /// The caller's conversations.
        conversations: Vec<ConversationView>,
    },
    /// Reply to `get_messages`.
    Messages {
        /// The conversation the log belongs to.
        conversation_id: ConversationId,
        /// The ordered log.
        messages: Vec<Message>,
    },
    /// Direct error reply.
    Error {
        /// Error code.
        code: String,
        /// Error description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_wire_format() {
        let raw = r#"{"event":"send_friend_request","from":"6f0f3a60-3b2f-4a5e-9f5e-0d6a3f1b2c4d","to":"aa0f3a60-3b2f-4a5e-9f5e-0d6a3f1b2c4d"}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        assert!(matches!(event, ClientEvent::SendFriendRequest { .. }));
    }

    #[test]
    fn test_text_message_kind_uses_type_field() {
        let raw = format!(
            r#"{{"event":"text_message","from":"{}","to":"{}","conversation_id":"{}","message":"hi","type":"text"}}"#,
            UserId::new(),
            UserId::new(),
            ConversationId::new(),
        );
        let event: ClientEvent = serde_json::from_str(&raw).unwrap();
        match event {
            ClientEvent::TextMessage { kind, message, .. } => {
                assert_eq!(kind, MessageKind::Text);
                assert_eq!(message, "hi");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tag_fails_to_parse() {
        let raw = r#"{"event":"subscribe","channel":"general"}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn test_outbound_error_wire_format() {
        let event = ServerEvent::Error {
            code: "NOT_FOUND".to_string(),
            message: "Conversation gone".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["code"], "NOT_FOUND");
    }

    #[test]
    fn test_known_tags_match_variants() {
        for tag in ClientEvent::KNOWN_TAGS {
            // Every known tag must at least be recognized as a variant
            // (payload errors are fine, unknown-variant errors are not).
            let raw = format!(r#"{{"event":"{tag}"}}"#);
            let err = serde_json::from_str::<ClientEvent>(&raw).unwrap_err();
            assert!(
                !err.to_string().contains("unknown variant"),
                "tag {tag} not recognized"
            );
        }
    }
}
