//! User presence status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a user currently has a live connection.
///
/// Mirrored onto the persisted user record so peers can read it; the live
/// connection handle itself is process-local and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "presence_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// The user has a live connection attached.
    Online,
    /// No live connection.
    Offline,
}

impl PresenceStatus {
    /// Check if the status is online.
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl Default for PresenceStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PresenceStatus {
    type Err = letstalk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            _ => Err(letstalk_core::AppError::validation(format!(
                "Invalid presence status: '{s}'. Expected one of: online, offline"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(
            "online".parse::<PresenceStatus>().unwrap(),
            PresenceStatus::Online
        );
        assert_eq!(
            "OFFLINE".parse::<PresenceStatus>().unwrap(),
            PresenceStatus::Offline
        );
        assert!("away".parse::<PresenceStatus>().is_err());
    }

    #[test]
    fn test_default_is_offline() {
        assert_eq!(PresenceStatus::default(), PresenceStatus::Offline);
        assert!(!PresenceStatus::default().is_online());
    }
}
