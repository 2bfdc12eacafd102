use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex, RwLock};

use stage_core::aggregate::AggregateStats;
use stage_core::avatar::Avatar;
use stage_core::error::StageError;
use stage_core::ledger::{VoteLedger, VoteOutcome};
use stage_core::phase::{Phase, PhaseCommand, PhaseState};
use stage_core::presence::{VoterPresenceEntry, VoterWall};
use stage_core::session::SessionConfig;
use stage_core::types::{DbId, Timestamp, VoterId};
use stage_core::vote::{Vote, VoteType};
use stage_events::{AuditCommand, StageUpdate, SyncHub};

/// Everything a late joiner needs to render one session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSnapshot {
    pub config: SessionConfig,
    pub phase: PhaseState,
    pub stats: AggregateStats,
    pub voters: Vec<VoterPresenceEntry>,
}

/// Outcome of a vote submission, as surfaced to the voter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteStatus {
    Recorded,
    Changed,
    /// Identical resubmission (client retry); nothing happened.
    Unchanged,
}

/// Response payload for a successful submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub status: VoteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes_remaining: Option<u32>,
}

/// Mutable state of one live session. Every field is owned here and only
/// mutated under the session lock.
struct LiveSession {
    config: SessionConfig,
    phase: PhaseState,
    ledger: VoteLedger,
    stats: AggregateStats,
    wall: VoterWall,
}

impl LiveSession {
    fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            config: self.config.clone(),
            phase: self.phase,
            stats: self.stats,
            voters: self.wall.entries().to_vec(),
        }
    }
}

/// Registry of live sessions plus the engine's output channels.
///
/// Designed to be shared via `Arc<StageEngine>`. Each session's state sits
/// behind its own `Mutex`, so writes for one `(session, voter)` key are
/// linearizable while sessions proceed in parallel.
pub struct StageEngine {
    sessions: RwLock<HashMap<DbId, Arc<Mutex<LiveSession>>>>,
    hub: Arc<SyncHub>,
    audit: mpsc::UnboundedSender<AuditCommand>,
}

impl StageEngine {
    pub fn new(hub: Arc<SyncHub>, audit: mpsc::UnboundedSender<AuditCommand>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            hub,
            audit,
        }
    }

    /// Bring a session live, rebuilding ledger, aggregate and wall from
    /// persisted votes (in first-submission order). Replaces any previous
    /// live state for the same id.
    pub async fn open_session(
        &self,
        config: SessionConfig,
        phase: PhaseState,
        votes: Vec<Vote>,
    ) {
        let session_id = config.session_id;
        // The wall needs the caller-supplied first-submission order; the
        // ledger map discards it.
        let wall = VoterWall::hydrate(config.max_wall_size, &votes);
        let ledger = VoteLedger::hydrate(session_id, votes);
        let stats = AggregateStats::recompute(session_id, ledger.votes());

        let session = LiveSession {
            phase,
            stats,
            wall,
            ledger,
            config,
        };

        self.sessions
            .write()
            .await
            .insert(session_id, Arc::new(Mutex::new(session)));
        tracing::info!(session_id, "Stage session opened");
    }

    /// Ids of every live session (countdown task sweep).
    pub async fn session_ids(&self) -> Vec<DbId> {
        self.sessions.read().await.keys().copied().collect()
    }

    async fn session(&self, session_id: DbId) -> Result<Arc<Mutex<LiveSession>>, StageError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(StageError::SessionNotFound(session_id))
    }

    /// Validate and commit one vote.
    ///
    /// Every accepted (non-`Unchanged`) call recomputes the aggregate from
    /// the full ledger, folds the vote into the wall, queues the durable
    /// write and broadcasts fresh `liveStats` and `voters` snapshots.
    pub async fn submit_vote(
        &self,
        session_id: DbId,
        voter_id: VoterId,
        vote_type: VoteType,
        avatar: Avatar,
        weight: u32,
    ) -> Result<VoteReceipt, StageError> {
        if avatar.is_empty() {
            return Err(StageError::Validation("avatar must not be empty".into()));
        }
        if weight == 0 {
            return Err(StageError::Validation("weight must be positive".into()));
        }

        let session = self.session(session_id).await?;
        let mut guard = session.lock().await;
        let session = &mut *guard;
        let now = Utc::now();

        // A vote may be the first caller to observe an elapsed countdown.
        self.resolve_phase(session_id, session, now).await;

        if session.phase.phase != Phase::Voting {
            return Err(StageError::InvalidPhaseTransition {
                from: session.phase.phase,
                requested: "vote",
            });
        }

        let policy = session.config.change_policy;
        let (outcome, vote) = session
            .ledger
            .submit(voter_id, vote_type, avatar, weight, policy, now)?;

        let status = match outcome {
            VoteOutcome::Recorded => VoteStatus::Recorded,
            VoteOutcome::Changed { .. } => VoteStatus::Changed,
            VoteOutcome::Unchanged => {
                // Retry of an identical vote: nothing changed, nothing to
                // recompute or broadcast.
                return Ok(VoteReceipt {
                    status: VoteStatus::Unchanged,
                    changes_remaining: None,
                });
            }
        };

        session.stats = AggregateStats::recompute(session_id, session.ledger.votes());
        session.wall.observe(&vote);

        // Durable write-behind; an accepted vote is never rolled back by a
        // persistence or fan-out failure.
        let _ = self.audit.send(AuditCommand::RecordVote(vote));

        self.hub
            .publish(session_id, StageUpdate::LiveStats(session.stats))
            .await;
        self.hub
            .publish(
                session_id,
                StageUpdate::Voters(session.wall.entries().to_vec()),
            )
            .await;

        tracing::debug!(
            session_id,
            voter_id = %voter_id,
            total_voters = session.stats.total_voters,
            "Vote committed"
        );

        let changes_remaining = match outcome {
            VoteOutcome::Changed { changes_remaining } => changes_remaining,
            _ => None,
        };
        Ok(VoteReceipt {
            status,
            changes_remaining,
        })
    }

    /// Apply an operator phase command.
    ///
    /// `fresh_round` only applies to `Reset` and clears the session's
    /// votes for a new round; without it votes persist for audit.
    pub async fn phase_command(
        &self,
        session_id: DbId,
        command: PhaseCommand,
        fresh_round: bool,
    ) -> Result<StageSnapshot, StageError> {
        let session = self.session(session_id).await?;
        let mut session = session.lock().await;
        let now = Utc::now();

        session.phase.apply(command, now)?;

        if command == PhaseCommand::Reset && fresh_round {
            session.ledger.clear();
            session.wall.clear();
            session.stats = AggregateStats::empty(session_id);
            let _ = self.audit.send(AuditCommand::ClearVotes(session_id));
            self.hub
                .publish(session_id, StageUpdate::LiveStats(session.stats))
                .await;
            self.hub
                .publish(session_id, StageUpdate::Voters(Vec::new()))
                .await;
        }

        let _ = self.audit.send(AuditCommand::PhaseChanged {
            session_id,
            state: session.phase,
        });
        self.hub
            .publish(session_id, StageUpdate::Phase(session.phase))
            .await;

        tracing::info!(session_id, phase = %session.phase.phase, "Phase command applied");
        Ok(session.snapshot())
    }

    /// Replace the operator configuration and broadcast it.
    pub async fn update_config(
        &self,
        session_id: DbId,
        config: SessionConfig,
    ) -> Result<StageSnapshot, StageError> {
        let session = self.session(session_id).await?;
        let mut session = session.lock().await;

        session.phase.countdown_secs = config.countdown_secs;
        session.config = config;

        self.hub
            .publish(session_id, StageUpdate::Config(session.config.clone()))
            .await;
        Ok(session.snapshot())
    }

    /// Full current state for late joiners; resolves an elapsed countdown
    /// on the way out.
    pub async fn snapshot(&self, session_id: DbId) -> Result<StageSnapshot, StageError> {
        let session = self.session(session_id).await?;
        let mut guard = session.lock().await;
        self.resolve_phase(session_id, &mut guard, Utc::now()).await;
        Ok(guard.snapshot())
    }

    /// Current operator configuration (base for config patches).
    pub async fn config(&self, session_id: DbId) -> Result<SessionConfig, StageError> {
        let session = self.session(session_id).await?;
        let session = session.lock().await;
        Ok(session.config.clone())
    }

    /// The server-authoritative answer to "has this voter voted?".
    pub async fn voter_record(
        &self,
        session_id: DbId,
        voter_id: VoterId,
    ) -> Result<Option<Vote>, StageError> {
        let session = self.session(session_id).await?;
        let session = session.lock().await;
        Ok(session.ledger.get(&voter_id).cloned())
    }

    /// Resolve the timer-driven countdown for one session. Returns the
    /// phase state if a transition happened (countdown task sweep).
    pub async fn resolve_session(&self, session_id: DbId) -> Result<Option<PhaseState>, StageError> {
        let session = self.session(session_id).await?;
        let mut guard = session.lock().await;
        let transitioned = self
            .resolve_phase(session_id, &mut guard, Utc::now())
            .await;
        Ok(transitioned.then_some(guard.phase))
    }

    /// Shared countdown resolution: broadcast and persist on the call that
    /// actually performs the transition, no-op otherwise.
    async fn resolve_phase(
        &self,
        session_id: DbId,
        session: &mut LiveSession,
        now: Timestamp,
    ) -> bool {
        if !session.phase.resolve(now) {
            return false;
        }
        let _ = self.audit.send(AuditCommand::PhaseChanged {
            session_id,
            state: session.phase,
        });
        self.hub
            .publish(session_id, StageUpdate::Phase(session.phase))
            .await;
        tracing::info!(session_id, "Countdown elapsed, voting open");
        true
    }

    /// The update frames a fresh subscriber should receive before any
    /// incremental publishes.
    pub async fn initial_updates(
        &self,
        session_id: DbId,
    ) -> Result<Vec<StageUpdate>, StageError> {
        let snapshot = self.snapshot(session_id).await?;
        Ok(vec![
            StageUpdate::Config(snapshot.config),
            StageUpdate::Phase(snapshot.phase),
            StageUpdate::LiveStats(snapshot.stats),
            StageUpdate::Voters(snapshot.voters),
        ])
    }
}
