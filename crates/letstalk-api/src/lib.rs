//! # letstalk-api
//!
//! HTTP surface for LetsTalk: the WebSocket upgrade that feeds the
//! real-time engine, plus the authenticated read-only roster endpoints
//! and health probes.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
