//! # letstalk-core
//!
//! Shared foundation for the LetsTalk chat backend:
//!
//! - [`error::AppError`] / [`error::ErrorKind`] — unified error type
//! - [`result::AppResult`] — result alias used across all crates
//! - [`config`] — TOML + environment configuration schemas
//! - [`types::id`] — newtype UUID identifiers for domain entities

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
