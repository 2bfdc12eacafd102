//! Session phase state machine.
//!
//! Operator commands drive `standby -> countdown`, `voting -> results` and
//! `results -> standby`; `countdown -> voting` is timer-driven and derived
//! from the shared `entered_at` timestamp, so any client can resolve the
//! transition at any time without coordination.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::StageError;
use crate::types::Timestamp;

/// Lifecycle stage of a voting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Standby,
    Countdown,
    Voting,
    Results,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Standby => "standby",
            Self::Countdown => "countdown",
            Self::Voting => "voting",
            Self::Results => "results",
        };
        f.write_str(name)
    }
}

/// Operator-issued phase commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseCommand {
    StartCountdown,
    EndVoting,
    Reset,
}

impl PhaseCommand {
    fn name(self) -> &'static str {
        match self {
            Self::StartCountdown => "countdown",
            Self::EndVoting => "results",
            Self::Reset => "standby",
        }
    }
}

/// Shared phase state for one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseState {
    pub phase: Phase,
    /// When the current phase was entered. For the timer-driven
    /// `countdown -> voting` boundary this is advanced by exactly the
    /// countdown duration, so every subscriber computes the same logical
    /// transition instant.
    pub entered_at: Timestamp,
    pub countdown_secs: u32,
}

impl PhaseState {
    pub fn new(countdown_secs: u32, now: Timestamp) -> Self {
        Self {
            phase: Phase::Standby,
            entered_at: now,
            countdown_secs,
        }
    }

    /// Apply an operator command.
    ///
    /// Resolves any elapsed countdown first, so commands act on the phase
    /// clients actually observe. An illegal request leaves the state
    /// untouched and returns [`StageError::InvalidPhaseTransition`].
    pub fn apply(&mut self, command: PhaseCommand, now: Timestamp) -> Result<Phase, StageError> {
        self.resolve(now);

        let next = match (self.phase, command) {
            (Phase::Standby, PhaseCommand::StartCountdown) => Phase::Countdown,
            (Phase::Voting, PhaseCommand::EndVoting) => Phase::Results,
            (Phase::Results, PhaseCommand::Reset) => Phase::Standby,
            _ => {
                return Err(StageError::InvalidPhaseTransition {
                    from: self.phase,
                    requested: command.name(),
                })
            }
        };

        self.phase = next;
        self.entered_at = now;
        Ok(next)
    }

    /// Resolve the timer-driven `countdown -> voting` transition.
    ///
    /// Idempotent: returns `true` only on the call that performs the
    /// transition. Safe to call on every tick from any number of clients.
    pub fn resolve(&mut self, now: Timestamp) -> bool {
        if self.phase != Phase::Countdown {
            return false;
        }
        let duration = Duration::seconds(i64::from(self.countdown_secs));
        if now.signed_duration_since(self.entered_at) < duration {
            return false;
        }
        self.phase = Phase::Voting;
        // Anchor voting to the countdown boundary, not to whichever caller
        // happened to resolve it first.
        self.entered_at += duration;
        true
    }

    /// Seconds of countdown left, derived from the shared timestamp.
    /// `0.0` outside the countdown phase or once elapsed.
    pub fn remaining_secs(&self, now: Timestamp) -> f64 {
        if self.phase != Phase::Countdown {
            return 0.0;
        }
        let elapsed = now.signed_duration_since(self.entered_at);
        let remaining = f64::from(self.countdown_secs) - elapsed.num_milliseconds() as f64 / 1000.0;
        remaining.max(0.0)
    }

    /// Whether votes are accepted at `now`, countdown resolution included.
    pub fn is_voting(&self, now: Timestamp) -> bool {
        let mut projected = *self;
        projected.resolve(now);
        projected.phase == Phase::Voting
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn operator_path_through_all_phases() {
        let now = Utc::now();
        let mut state = PhaseState::new(10, now);

        assert_eq!(
            state.apply(PhaseCommand::StartCountdown, now).unwrap(),
            Phase::Countdown
        );

        // Countdown elapses; voting is reached via resolve, not a command.
        let later = now + Duration::seconds(10);
        assert!(state.resolve(later));
        assert_eq!(state.phase, Phase::Voting);

        assert_eq!(
            state.apply(PhaseCommand::EndVoting, later).unwrap(),
            Phase::Results
        );
        assert_eq!(
            state.apply(PhaseCommand::Reset, later).unwrap(),
            Phase::Standby
        );
    }

    #[test]
    fn invalid_transition_is_a_noop() {
        let now = Utc::now();
        let mut state = PhaseState::new(10, now);
        state.phase = Phase::Results;

        let err = state.apply(PhaseCommand::StartCountdown, now).unwrap_err();
        assert!(matches!(
            err,
            StageError::InvalidPhaseTransition {
                from: Phase::Results,
                ..
            }
        ));
        assert_eq!(state.phase, Phase::Results);
    }

    #[test]
    fn countdown_resolves_exactly_once() {
        let now = Utc::now();
        let mut state = PhaseState::new(5, now);
        state.apply(PhaseCommand::StartCountdown, now).unwrap();

        let early = now + Duration::seconds(4);
        assert!(!state.resolve(early));
        assert_eq!(state.phase, Phase::Countdown);

        let boundary = now + Duration::seconds(5);
        assert!(state.resolve(boundary));
        assert_eq!(state.phase, Phase::Voting);

        // Second resolution after the boundary reports no transition.
        assert!(!state.resolve(boundary + Duration::seconds(1)));
    }

    #[test]
    fn voting_start_is_anchored_to_the_boundary() {
        let now = Utc::now();
        let mut state = PhaseState::new(5, now);
        state.apply(PhaseCommand::StartCountdown, now).unwrap();

        // A laggy client resolves 3 seconds late; the voting phase still
        // starts at the shared boundary instant.
        state.resolve(now + Duration::seconds(8));
        assert_eq!(state.entered_at, now + Duration::seconds(5));
    }

    #[test]
    fn remaining_derives_from_shared_timestamp() {
        let now = Utc::now();
        let mut state = PhaseState::new(10, now);
        state.apply(PhaseCommand::StartCountdown, now).unwrap();

        let mid = now + Duration::seconds(4);
        assert!((state.remaining_secs(mid) - 6.0).abs() < 0.001);

        let past = now + Duration::seconds(30);
        assert_eq!(state.remaining_secs(past), 0.0);
    }

    #[test]
    fn end_voting_works_after_unresolved_countdown() {
        // Operator ends voting before any client happened to call resolve.
        let now = Utc::now();
        let mut state = PhaseState::new(5, now);
        state.apply(PhaseCommand::StartCountdown, now).unwrap();

        let later = now + Duration::seconds(20);
        assert_eq!(
            state.apply(PhaseCommand::EndVoting, later).unwrap(),
            Phase::Results
        );
    }

    #[test]
    fn is_voting_respects_the_countdown() {
        let now = Utc::now();
        let mut state = PhaseState::new(5, now);
        assert!(!state.is_voting(now));

        state.apply(PhaseCommand::StartCountdown, now).unwrap();
        assert!(!state.is_voting(now + Duration::seconds(2)));
        assert!(state.is_voting(now + Duration::seconds(6)));
    }
}
