//! # letstalk-auth
//!
//! Verification of identity tokens issued by the external auth layer.
//! Issuance, password handling, and account lifecycle live outside this
//! system; all the realtime engine needs is a trustworthy user id per
//! session, which [`jwt::JwtDecoder`] extracts.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder};
