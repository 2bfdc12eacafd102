//! The update envelope fanned out to subscribers.

use serde::Serialize;

use stage_core::aggregate::AggregateStats;
use stage_core::phase::PhaseState;
use stage_core::presence::VoterPresenceEntry;
use stage_core::session::SessionConfig;

/// One realtime update on a session's stream.
///
/// Every variant carries the full current value of its logical channel;
/// there is no diff protocol. A subscriber that skips intermediate updates
/// still renders a self-consistent state from whichever one it applies
/// last. The session is identified by the stream the update arrives on,
/// not by the envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "channel", content = "payload", rename_all = "camelCase")]
pub enum StageUpdate {
    /// Operator-set thresholds, labels and vote-change policy.
    Config(SessionConfig),
    /// The shared phase state, countdown anchor included.
    Phase(PhaseState),
    /// Recomputed aggregate totals.
    LiveStats(AggregateStats),
    /// The capped voter wall, in insertion order.
    Voters(Vec<VoterPresenceEntry>),
}
