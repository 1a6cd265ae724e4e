//! LetsTalk Server — real-time chat backend
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use letstalk_core::config::AppConfig;
use letstalk_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("LETSTALK_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting LetsTalk v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = letstalk_database::DatabasePool::connect(&config.database).await?;
    letstalk_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Stores ───────────────────────────────────────────
    let user_store: Arc<dyn letstalk_database::UserStore> = Arc::new(
        letstalk_database::postgres::PgUserStore::new(db.pool().clone()),
    );
    let request_store: Arc<dyn letstalk_database::FriendRequestStore> = Arc::new(
        letstalk_database::postgres::PgFriendRequestStore::new(db.pool().clone()),
    );
    let conversation_store: Arc<dyn letstalk_database::ConversationStore> = Arc::new(
        letstalk_database::postgres::PgConversationStore::new(db.pool().clone()),
    );

    // ── Step 3: Presence reconciliation ──────────────────────────
    // Live handles died with the previous process; any record still
    // claiming to be online is stale.
    let reset = user_store.reset_presence().await?;
    if reset > 0 {
        tracing::info!(records = reset, "Reset stale presence records");
    }

    // ── Step 4: Services + realtime engine ───────────────────────
    let jwt_decoder = Arc::new(letstalk_auth::JwtDecoder::new(&config.auth));
    let roster =
        letstalk_service::RosterService::new(user_store.clone(), request_store.clone());
    let realtime = letstalk_realtime::RealtimeEngine::new(
        config.realtime.clone(),
        user_store,
        request_store,
        conversation_store,
    );

    // ── Step 5: HTTP server ──────────────────────────────────────
    let app_state = letstalk_api::AppState {
        config: Arc::new(config.clone()),
        db: db.clone(),
        jwt_decoder,
        realtime: realtime.clone(),
        roster,
    };

    let app = letstalk_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("LetsTalk server listening on {addr}");

    // ── Step 6: Graceful shutdown ────────────────────────────────
    let shutdown_engine = realtime.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_engine.shutdown().await;
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    tracing::info!("LetsTalk server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
