//! PostgreSQL implementations of the store traits.

pub mod conversation;
pub mod friend_request;
pub mod user;

pub use conversation::PgConversationStore;
pub use friend_request::PgFriendRequestStore;
pub use user::PgUserStore;
