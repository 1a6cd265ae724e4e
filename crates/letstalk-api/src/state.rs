//! Shared application state handed to every handler.

use std::sync::Arc;

use letstalk_auth::JwtDecoder;
use letstalk_core::config::AppConfig;
use letstalk_database::DatabasePool;
use letstalk_realtime::RealtimeEngine;
use letstalk_service::RosterService;

/// Application state threaded through the axum router.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Database pool (for health checks).
    pub db: DatabasePool,
    /// Token verifier for the external identity provider.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Real-time engine.
    pub realtime: RealtimeEngine,
    /// Roster read services.
    pub roster: RosterService,
}
