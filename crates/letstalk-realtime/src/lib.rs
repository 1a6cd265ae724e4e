//! # letstalk-realtime
//!
//! Real-time engine for LetsTalk. Provides:
//!
//! - Per-connection handles with bounded outbound channels
//! - A presence registry mapping users to their live connection
//! - Typed inbound/outbound events dispatched by an exhaustive router
//! - The engine wiring it all together over the store traits

pub mod connection;
pub mod engine;
pub mod event;
pub mod presence;
pub mod router;

pub use connection::handle::ConnectionHandle;
pub use connection::session::SessionContext;
pub use engine::RealtimeEngine;
pub use event::{ClientEvent, ServerEvent};
pub use presence::registry::PresenceRegistry;
pub use router::EventRouter;
