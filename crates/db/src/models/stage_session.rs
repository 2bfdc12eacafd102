//! Stage session row model.

use sqlx::FromRow;

use stage_core::phase::{Phase, PhaseState};
use stage_core::session::{SessionConfig, VoteSideMeta};
use stage_core::threshold::ThresholdBand;
use stage_core::types::{DbId, Timestamp};
use stage_core::vote::VoteChangePolicy;

/// A row from the `stage_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct StageSessionRow {
    pub id: DbId,
    pub phase: String,
    pub phase_entered_at: Timestamp,
    pub countdown_secs: i32,
    pub success_threshold: f64,
    pub like_label: String,
    pub like_icon: String,
    pub dislike_label: String,
    pub dislike_icon: String,
    pub change_policy: String,
    pub change_limit: Option<i32>,
    pub threshold_bands: serde_json::Value,
    pub max_wall_size: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StageSessionRow {
    /// The operator-facing configuration slice of this row.
    pub fn config(&self) -> Result<SessionConfig, sqlx::Error> {
        let change_policy = match self.change_policy.as_str() {
            "none" => VoteChangePolicy::None,
            "limited" => VoteChangePolicy::Limited(self.change_limit.unwrap_or(0).max(0) as u32),
            "unlimited" => VoteChangePolicy::Unlimited,
            other => return Err(decode_error("change_policy", other)),
        };

        let threshold_bands: Vec<ThresholdBand> =
            serde_json::from_value(self.threshold_bands.clone())
                .map_err(|e| sqlx::Error::Decode(e.into()))?;

        Ok(SessionConfig {
            session_id: self.id,
            countdown_secs: self.countdown_secs.max(0) as u32,
            success_threshold: self.success_threshold,
            like: VoteSideMeta {
                label: self.like_label.clone(),
                icon: self.like_icon.clone(),
            },
            dislike: VoteSideMeta {
                label: self.dislike_label.clone(),
                icon: self.dislike_icon.clone(),
            },
            change_policy,
            threshold_bands,
            max_wall_size: self.max_wall_size.max(1) as usize,
        })
    }

    /// The shared phase state slice of this row.
    pub fn phase_state(&self) -> Result<PhaseState, sqlx::Error> {
        let phase = match self.phase.as_str() {
            "standby" => Phase::Standby,
            "countdown" => Phase::Countdown,
            "voting" => Phase::Voting,
            "results" => Phase::Results,
            other => return Err(decode_error("phase", other)),
        };
        Ok(PhaseState {
            phase,
            entered_at: self.phase_entered_at,
            countdown_secs: self.countdown_secs.max(0) as u32,
        })
    }
}

/// Column values for persisting a change policy.
pub(crate) fn policy_columns(policy: VoteChangePolicy) -> (&'static str, Option<i32>) {
    match policy {
        VoteChangePolicy::None => ("none", None),
        VoteChangePolicy::Limited(limit) => ("limited", Some(limit as i32)),
        VoteChangePolicy::Unlimited => ("unlimited", None),
    }
}

/// Text name of a phase as stored in the `phase` column.
pub(crate) fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Standby => "standby",
        Phase::Countdown => "countdown",
        Phase::Voting => "voting",
        Phase::Results => "results",
    }
}

fn decode_error(column: &str, value: &str) -> sqlx::Error {
    sqlx::Error::Decode(format!("unexpected {column} value: {value}").into())
}
