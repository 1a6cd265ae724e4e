//! Friend request entity.

pub mod model;

pub use model::{FriendRequest, NewFriendRequest};
