//! Aggregate vote statistics, recomputed in full on every commit.

use serde::Serialize;

use crate::types::DbId;
use crate::vote::{Vote, VoteType};

/// Derived totals for one session.
///
/// Always re-derived from the full vote set, never patched incrementally
/// from client input, so concurrent writers and vote changes cannot make
/// the projection drift. A vote of weight `w` contributes `w` to its side
/// and to `total_voters`, which keeps the invariant
/// `total_likes + total_dislikes == total_voters` under weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub session_id: DbId,
    pub total_voters: u64,
    pub total_likes: u64,
    pub total_dislikes: u64,
}

impl AggregateStats {
    /// Empty stats for a session with no votes yet.
    pub fn empty(session_id: DbId) -> Self {
        Self {
            session_id,
            total_voters: 0,
            total_likes: 0,
            total_dislikes: 0,
        }
    }

    /// Re-derive the totals from the current vote set.
    pub fn recompute<'a, I>(session_id: DbId, votes: I) -> Self
    where
        I: IntoIterator<Item = &'a Vote>,
    {
        let mut stats = Self::empty(session_id);
        for vote in votes {
            let weight = u64::from(vote.weight);
            stats.total_voters += weight;
            match vote.vote_type {
                VoteType::Like => stats.total_likes += weight,
                VoteType::Dislike => stats.total_dislikes += weight,
            }
        }
        stats
    }

    /// Like share in percent. `0.0` for an empty session (never divides
    /// by zero).
    pub fn percentage(&self) -> f64 {
        if self.total_voters == 0 {
            return 0.0;
        }
        self.total_likes as f64 / self.total_voters as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
