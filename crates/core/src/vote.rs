//! Vote records and the vote-change policy.

use serde::{Deserialize, Serialize};

use crate::avatar::Avatar;
use crate::types::{DbId, Timestamp, VoterId};

/// The two directions a voter can swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Like,
    Dislike,
}

/// One voter's committed vote within a session.
///
/// At most one `Vote` exists per `(session_id, voter_id)`; the ledger
/// enforces the uniqueness invariant on every write path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub session_id: DbId,
    pub voter_id: VoterId,
    pub vote_type: VoteType,
    pub avatar: Avatar,
    /// Scalar multiplier (judges may count more than once).
    pub weight: u32,
    /// How many times the voter has changed this vote. Only increases,
    /// bounded by the session's [`VoteChangePolicy`].
    pub change_count: u32,
    pub submitted_at: Timestamp,
}

impl Vote {
    /// Judges are voters whose vote carries extra weight.
    pub fn is_judge(&self) -> bool {
        self.weight > 1
    }
}

/// How many times a voter may change a committed vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "limit", rename_all = "lowercase")]
pub enum VoteChangePolicy {
    /// The first vote is final.
    None,
    /// Up to `n` changes after the first vote.
    Limited(u32),
    /// Voters may change their mind freely.
    Unlimited,
}

impl VoteChangePolicy {
    /// Whether a vote with `change_count` prior changes may change again.
    pub fn allows_change(&self, change_count: u32) -> bool {
        match self {
            Self::None => false,
            Self::Limited(limit) => change_count < *limit,
            Self::Unlimited => true,
        }
    }

    /// Changes remaining after `change_count` have been used.
    ///
    /// `None` means unbounded; under policy `None` this is `Some(0)`.
    pub fn remaining(&self, change_count: u32) -> Option<u32> {
        match self {
            Self::None => Some(0),
            Self::Limited(limit) => Some(limit.saturating_sub(change_count)),
            Self::Unlimited => None,
        }
    }
}
