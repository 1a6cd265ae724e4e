//! User entity: model and presence status.

pub mod model;
pub mod status;

pub use model::{NewUser, User, UserProfile};
pub use status::PresenceStatus;
