//! Stage domain logic.
//!
//! Pure building blocks for the live audience-voting engine: the vote
//! ledger, aggregate recomputation, the phase state machine, threshold
//! zones and the success latch, the voter wall, and the client-side
//! contracts (swipe latch, voter flow, percentage interpolation).
//!
//! Nothing in this crate performs I/O. The `stage-api` engine owns the
//! locking and fan-out around these types.

pub mod aggregate;
pub mod avatar;
pub mod error;
pub mod interpolate;
pub mod ledger;
pub mod phase;
pub mod presence;
pub mod session;
pub mod swipe;
pub mod threshold;
pub mod types;
pub mod vote;
pub mod voter_flow;

pub use aggregate::AggregateStats;
pub use avatar::Avatar;
pub use error::StageError;
pub use ledger::{VoteLedger, VoteOutcome};
pub use phase::{Phase, PhaseCommand, PhaseState};
pub use presence::{VoterPresenceEntry, VoterWall};
pub use session::{SessionConfig, VoteSideMeta};
pub use threshold::{zone_for, SuccessLatch, ThresholdBand};
pub use vote::{Vote, VoteChangePolicy, VoteType};
