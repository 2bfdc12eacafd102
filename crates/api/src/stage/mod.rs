//! The live voting engine.
//!
//! [`StageEngine`] owns the per-session live state (ledger, aggregate,
//! wall, phase) and is the only writer of all of it. Handlers and the
//! countdown task drive it; the `SyncHub` fans its output out to
//! subscribers.

mod countdown;
mod engine;

pub use countdown::start_countdown_task;
pub use engine::{StageEngine, StageSnapshot, VoteReceipt, VoteStatus};
