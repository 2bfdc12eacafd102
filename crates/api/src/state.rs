use std::sync::Arc;

use crate::config::ServerConfig;
use crate::stage::StageEngine;
use stage_events::SyncHub;

/// Shared state handed to every handler via `State<AppState>`.
///
/// Cheap to clone: the pool is internally reference-counted and the rest
/// sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Postgres pool (hydration reads and the operator surface).
    pub pool: stage_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// The live voting engine, sole writer of all session state.
    pub engine: Arc<StageEngine>,
    /// Realtime fan-out to display screens and voter phones.
    pub hub: Arc<SyncHub>,
}
