use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stage_api::config::ServerConfig;
use stage_api::router::build_app_router;
use stage_api::stage::{start_countdown_task, StageEngine};
use stage_api::state::AppState;
use stage_db::repositories::{StageSessionRepo, VoteRepo};
use stage_events::{SyncHub, VoteAudit};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stage_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = stage_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    stage_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    stage_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    // --- Realtime sync hub ---
    let hub = Arc::new(SyncHub::new());

    // --- Vote audit (durable write-behind) ---
    let (audit_tx, audit_rx) = VoteAudit::channel();
    let audit_handle = tokio::spawn(VoteAudit::run(pool.clone(), audit_rx));

    // --- Stage engine ---
    let engine = Arc::new(StageEngine::new(Arc::clone(&hub), audit_tx));

    // Hydrate persisted sessions so displays resume mid-round after a
    // restart.
    let rows = StageSessionRepo::list(&pool)
        .await
        .expect("Failed to list stage sessions");
    for row in rows {
        let session_config = row.config().expect("Malformed session row");
        let phase = row.phase_state().expect("Malformed session row");
        let votes = VoteRepo::list_for_session(&pool, session_config.session_id)
            .await
            .expect("Failed to load votes");
        engine.open_session(session_config, phase, votes).await;
    }
    tracing::info!(
        sessions = engine.session_ids().await.len(),
        "Stage engine hydrated"
    );

    // --- Countdown resolver ---
    let countdown_cancel = tokio_util::sync::CancellationToken::new();
    let countdown_handle = start_countdown_task(Arc::clone(&engine), countdown_cancel.clone());

    // --- App state / router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine: Arc::clone(&engine),
        hub: Arc::clone(&hub),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    // Stop the countdown resolver.
    countdown_cancel.cancel();
    let _ = tokio::time::timeout(drain, countdown_handle).await;

    // Close every subscription so WebSocket forward tasks drain.
    hub.shutdown_all().await;

    // Dropping the engine closes the audit queue; the audit loop then
    // flushes whatever backlog is left before exiting.
    drop(engine);
    let _ = tokio::time::timeout(drain, audit_handle).await;
    tracing::info!("Vote audit flushed");

    tracing::info!("Graceful shutdown complete");
}

/// Resolve on SIGINT or, on Unix, SIGTERM, whichever lands first, so the
/// server drains cleanly under both an interactive Ctrl-C and a process
/// manager stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
