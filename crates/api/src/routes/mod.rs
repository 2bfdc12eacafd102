pub mod health;

use axum::routing::{any, get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /stage                                   create session (operator)
/// /stage/{session_id}                      full snapshot
/// /stage/{session_id}/config               operator config update (PUT)
/// /stage/{session_id}/phase                operator phase command (POST)
/// /stage/{session_id}/open                 re-hydrate from the database (POST)
/// /stage/{session_id}/votes                vote submission (POST)
/// /stage/{session_id}/votes/{voter_id}     voter reconciliation record
/// /stage/{session_id}/ws                   realtime subscription (WebSocket)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/stage", post(handlers::operator::create_session))
        .route("/stage/{session_id}", get(handlers::stage::get_snapshot))
        .route(
            "/stage/{session_id}/config",
            put(handlers::operator::update_config),
        )
        .route(
            "/stage/{session_id}/phase",
            post(handlers::operator::phase_command),
        )
        .route(
            "/stage/{session_id}/open",
            post(handlers::operator::reopen_session),
        )
        .route(
            "/stage/{session_id}/votes",
            post(handlers::stage::submit_vote),
        )
        .route(
            "/stage/{session_id}/votes/{voter_id}",
            get(handlers::stage::get_voter_record),
        )
        .route("/stage/{session_id}/ws", any(ws::stage_ws_handler))
}
