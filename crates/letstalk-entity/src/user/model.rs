//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use letstalk_core::types::id::{ConnectionId, UserId};

use super::status::PresenceStatus;

/// A registered user in the LetsTalk system.
///
/// Friendship is not a column here: it lives in the symmetric `friendships`
/// relation and is reached through the user store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address (unique, lowercase).
    pub email: String,
    /// Whether the account completed verification.
    pub verified: bool,
    /// Current presence status.
    pub status: PresenceStatus,
    /// Live connection currently attached to this user, if any.
    ///
    /// Owned exclusively by the presence registry; stale values left over
    /// from a crash are reset at startup.
    pub socket_id: Option<ConnectionId>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Full display name.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Project onto the display fields exposed to peers.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            status: self.status,
        }
    }
}

/// Display projection of a user: what peers see in rosters and
/// conversation participant lists. Never carries credentials or
/// connection internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub id: UserId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Presence status at projection time.
    pub status: PresenceStatus,
}

/// Data required to create a new user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Whether the account is verified.
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            verified: true,
            status: PresenceStatus::Offline,
            socket_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(sample_user().display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_profile_carries_display_fields_only() {
        let user = sample_user();
        let profile = user.profile();
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.email, user.email);
        assert_eq!(profile.status, PresenceStatus::Offline);
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("socket_id").is_none());
    }
}
