use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::stage::StageEngine;

/// How often the engine sweeps sessions for an elapsed countdown.
///
/// The transition itself is derived from the shared `entered_at`
/// timestamp (and is also resolved lazily by votes and snapshot reads);
/// this task only guarantees a broadcast happens near the boundary even
/// when no request is in flight.
const SWEEP_INTERVAL_MS: u64 = 250;

/// Spawn the background countdown resolver.
///
/// Runs until `cancel` fires. The returned handle lets shutdown wait for
/// the task to finish.
pub fn start_countdown_task(
    engine: Arc<StageEngine>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(SWEEP_INTERVAL_MS));
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("Countdown task stopped");
                    break;
                }
                _ = interval.tick() => {
                    for session_id in engine.session_ids().await {
                        // The session may have been closed between the
                        // sweep and the resolve; that is not an error.
                        let _ = engine.resolve_session(session_id).await;
                    }
                }
            }
        }
    })
}
