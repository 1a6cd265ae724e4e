//! Typed wire events.

pub mod types;

pub use types::{ClientEvent, ServerEvent};
