//! Friend request lifecycle.

pub mod service;

pub use service::FriendService;
