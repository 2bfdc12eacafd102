//! Durable write-behind for the live vote path.
//!
//! [`VoteAudit`] drains a command queue fed by the stage engine and writes
//! every accepted vote to the `votes` table (and phase changes to
//! `stage_sessions`). The live path never waits on the database: an
//! accepted vote is authoritative in the ledger, and a persistence failure
//! is logged and retried by the next write for the same key, never rolled
//! back.

use tokio::sync::mpsc;

use stage_core::phase::PhaseState;
use stage_core::types::DbId;
use stage_core::vote::Vote;
use stage_db::repositories::{StageSessionRepo, VoteRepo};
use stage_db::DbPool;

/// One unit of write-behind work.
#[derive(Debug, Clone)]
pub enum AuditCommand {
    /// Upsert an accepted (new or changed) vote by its natural key.
    RecordVote(Vote),
    /// Operator reset with a fresh round: drop the session's votes.
    ClearVotes(DbId),
    /// Persist a phase transition so restarts resume the shared state.
    PhaseChanged { session_id: DbId, state: PhaseState },
}

/// Background service that persists engine output to the database.
pub struct VoteAudit;

impl VoteAudit {
    /// Create the queue connecting the engine to the audit loop.
    pub fn channel() -> (
        mpsc::UnboundedSender<AuditCommand>,
        mpsc::UnboundedReceiver<AuditCommand>,
    ) {
        mpsc::unbounded_channel()
    }

    /// Run the persistence loop.
    ///
    /// Exits when the queue is closed (the engine dropped its sender
    /// during shutdown). Every queued command is attempted; failures are
    /// logged with enough context to re-derive the row by hand.
    pub async fn run(pool: DbPool, mut receiver: mpsc::UnboundedReceiver<AuditCommand>) {
        while let Some(command) = receiver.recv().await {
            match command {
                AuditCommand::RecordVote(vote) => {
                    if let Err(e) = VoteRepo::upsert(&pool, &vote).await {
                        tracing::error!(
                            error = %e,
                            session_id = vote.session_id,
                            voter_id = %vote.voter_id,
                            "Failed to persist vote"
                        );
                    }
                }
                AuditCommand::ClearVotes(session_id) => {
                    match VoteRepo::delete_for_session(&pool, session_id).await {
                        Ok(deleted) => {
                            tracing::info!(session_id, deleted, "Cleared votes for fresh round");
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                session_id,
                                "Failed to clear votes"
                            );
                        }
                    }
                }
                AuditCommand::PhaseChanged { session_id, state } => {
                    if let Err(e) =
                        StageSessionRepo::update_phase(&pool, session_id, &state).await
                    {
                        tracing::error!(
                            error = %e,
                            session_id,
                            phase = %state.phase,
                            "Failed to persist phase change"
                        );
                    }
                }
            }
        }
        tracing::info!("Audit queue closed, vote audit shutting down");
    }
}
