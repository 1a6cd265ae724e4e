//! Read-side roster lists.

pub mod service;

pub use service::{FriendRequestView, RosterService};
