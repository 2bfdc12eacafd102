use crate::phase::Phase;
use crate::types::DbId;

/// Domain error taxonomy for the Stage engine.
///
/// Policy errors (`AlreadyVoted`, `ChangeLimitExceeded`, `Validation`) are
/// terminal for the caller; `SyncUnavailable` is the only retryable variant.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("Voter has already cast a vote in this session")]
    AlreadyVoted,

    #[error("Vote change limit of {limit} reached")]
    ChangeLimitExceeded { limit: u32 },

    #[error("Invalid phase transition: {from} -> {requested}")]
    InvalidPhaseTransition { from: Phase, requested: &'static str },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Stage session not found: {0}")]
    SessionNotFound(DbId),

    #[error("Realtime sync layer unavailable")]
    SyncUnavailable,
}
