//! # letstalk-service
//!
//! Business logic for the LetsTalk chat backend, orchestrating the store
//! traits from `letstalk-database`:
//!
//! - [`friend::FriendService`] — friend-request lifecycle (pending → accepted)
//! - [`conversation::ConversationService`] — direct conversations and their
//!   append-only message logs
//! - [`roster::RosterService`] — read-side lists (users, friends, pending
//!   requests)

pub mod context;
pub mod conversation;
pub mod friend;
pub mod retry;
pub mod roster;

pub use context::RequestContext;
pub use conversation::{ConversationService, ConversationView};
pub use friend::FriendService;
pub use roster::{FriendRequestView, RosterService};
