//! # letstalk-entity
//!
//! Domain entity models for the LetsTalk chat backend: users and their
//! presence, pending friend requests, direct conversations, and messages.

pub mod conversation;
pub mod friend_request;
pub mod message;
pub mod user;

pub use conversation::Conversation;
pub use friend_request::{FriendRequest, NewFriendRequest};
pub use message::{Message, MessageKind, NewMessage};
pub use user::{NewUser, PresenceStatus, User, UserProfile};
