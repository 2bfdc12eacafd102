use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check payload: service, database and engine liveness.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether Postgres answered a probe query.
    pub db_healthy: bool,
    /// Sessions currently live in the stage engine.
    pub live_sessions: usize,
}

/// GET /health
///
/// The service keeps serving the live voting path even when the database
/// is down (the ledger is the authority), so a failed probe degrades the
/// status instead of failing the check outright.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = stage_db::health_check(&state.pool).await.is_ok();
    let live_sessions = state.engine.session_ids().await.len();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        live_sessions,
    })
}

/// Mounted at the root, not under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
