//! Stage realtime sync fabric.
//!
//! Building blocks for pushing live voting state to displays and voter
//! phones:
//!
//! - [`SyncHub`]: per-session subscribe/unsubscribe/publish hub with
//!   idempotent cancellation tokens.
//! - [`StageUpdate`]: the full-snapshot update envelope (config, phase,
//!   live stats, voter wall).
//! - [`VoteAudit`]: background service that writes accepted votes behind
//!   the live path into the `votes` table.

pub mod audit;
pub mod hub;
pub mod update;

pub use audit::{AuditCommand, VoteAudit};
pub use hub::{SubscriptionToken, SyncHub};
pub use update::StageUpdate;
