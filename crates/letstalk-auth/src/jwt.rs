//! JWT decoding and claim extraction.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use letstalk_core::AppResult;
use letstalk_core::config::auth::AuthConfig;
use letstalk_core::error::AppError;
use letstalk_core::types::id::UserId;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as a UUID string.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    /// The user id carried in `sub`.
    pub fn user_id(&self) -> AppResult<UserId> {
        Uuid::parse_str(&self.sub)
            .map(UserId::from_uuid)
            .map_err(|e| {
                AppError::with_source(
                    letstalk_core::ErrorKind::Authentication,
                    "Token subject is not a valid user id",
                    e,
                )
            })
    }
}

/// Verifies HS256 tokens signed with the secret shared with the issuer.
#[derive(Clone)]
pub struct JwtDecoder {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder").finish()
    }
}

impl JwtDecoder {
    /// Create a decoder from configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate a token, returning the user id it asserts.
    pub fn decode(&self, token: &str) -> AppResult<UserId> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| {
                AppError::with_source(
                    letstalk_core::ErrorKind::Authentication,
                    format!("Invalid token: {e}"),
                    e,
                )
            })?;
        data.claims.user_id()
    }
}
