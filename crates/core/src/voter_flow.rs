//! Voter-side flow state machine: `landing -> avatar_select -> voting ->
//! voted`.
//!
//! The local "already voted" marker is a UX hint only. On re-entry (page
//! reload) the flow must be reconciled against the server-authoritative
//! vote record before a fresh vote attempt is allowed.

use crate::vote::Vote;

/// Steps of the mobile voting flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoterFlowStep {
    Landing,
    AvatarSelect,
    Voting,
    Voted,
}

/// The voter's position in the flow.
#[derive(Debug)]
pub struct VoterFlow {
    step: VoterFlowStep,
}

impl VoterFlow {
    pub fn new() -> Self {
        Self {
            step: VoterFlowStep::Landing,
        }
    }

    pub fn step(&self) -> VoterFlowStep {
        self.step
    }

    /// Advance one step. Already-voted voters stay put: only the server
    /// record (via [`reconcile`](Self::reconcile)) moves a flow out of
    /// `Voted`.
    pub fn advance(&mut self) -> VoterFlowStep {
        self.step = match self.step {
            VoterFlowStep::Landing => VoterFlowStep::AvatarSelect,
            VoterFlowStep::AvatarSelect => VoterFlowStep::Voting,
            VoterFlowStep::Voting | VoterFlowStep::Voted => VoterFlowStep::Voted,
        };
        self.step
    }

    /// Align the flow with the server's authoritative vote record.
    ///
    /// `Some` vote means the voter already voted, whatever the local
    /// marker said; jump straight to `Voted`. `None` means the marker was
    /// stale (e.g. a fresh round after reset); restart at `Landing` so a
    /// new attempt is allowed.
    pub fn reconcile(&mut self, server_vote: Option<&Vote>) -> VoterFlowStep {
        self.step = match server_vote {
            Some(_) => VoterFlowStep::Voted,
            None => VoterFlowStep::Landing,
        };
        self.step
    }
}

impl Default for VoterFlow {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
