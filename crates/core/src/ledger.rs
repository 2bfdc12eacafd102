//! In-memory vote ledger for one live session.
//!
//! Pure logic, no locking and no persistence. The engine serializes all
//! mutations for a session behind its session lock, which makes every
//! write here a linearizable read-modify-write on the natural key
//! `(session_id, voter_id)`.

use std::collections::HashMap;

use crate::avatar::Avatar;
use crate::error::StageError;
use crate::types::{DbId, Timestamp, VoterId};
use crate::vote::{Vote, VoteChangePolicy, VoteType};

/// Result of a successful ledger write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// First vote from this voter.
    Recorded,
    /// An existing vote was replaced under the change policy.
    Changed {
        /// Changes still available, `None` when unbounded.
        changes_remaining: Option<u32>,
    },
    /// The submission was byte-identical to the stored vote; retries on
    /// timeout land here instead of failing.
    Unchanged,
}

/// All votes for a single session, keyed by voter.
#[derive(Debug)]
pub struct VoteLedger {
    session_id: DbId,
    votes: HashMap<VoterId, Vote>,
}

impl VoteLedger {
    pub fn new(session_id: DbId) -> Self {
        Self {
            session_id,
            votes: HashMap::new(),
        }
    }

    /// Rebuild a ledger from persisted votes (session open after restart).
    pub fn hydrate(session_id: DbId, votes: Vec<Vote>) -> Self {
        let votes = votes.into_iter().map(|v| (v.voter_id, v)).collect();
        Self { session_id, votes }
    }

    pub fn session_id(&self) -> DbId {
        self.session_id
    }

    pub fn get(&self, voter_id: &VoterId) -> Option<&Vote> {
        self.votes.get(voter_id)
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Iterate all committed votes (no ordering guarantee).
    pub fn votes(&self) -> impl Iterator<Item = &Vote> {
        self.votes.values()
    }

    /// Commit or change a vote for `voter_id`, returning the outcome and
    /// the vote as stored (for broadcast and write-behind).
    ///
    /// Semantics per the submission contract:
    /// - no existing vote: insert, [`VoteOutcome::Recorded`];
    /// - identical resubmission (same direction and avatar): no-op,
    ///   [`VoteOutcome::Unchanged`], regardless of policy;
    /// - differing vote and the policy allows another change: replace
    ///   direction and avatar, bump `change_count`, keep the original
    ///   weight, [`VoteOutcome::Changed`];
    /// - otherwise [`StageError::AlreadyVoted`] (policy `None`) or
    ///   [`StageError::ChangeLimitExceeded`].
    pub fn submit(
        &mut self,
        voter_id: VoterId,
        vote_type: VoteType,
        avatar: Avatar,
        weight: u32,
        policy: VoteChangePolicy,
        now: Timestamp,
    ) -> Result<(VoteOutcome, Vote), StageError> {
        let Some(existing) = self.votes.get_mut(&voter_id) else {
            let vote = Vote {
                session_id: self.session_id,
                voter_id,
                vote_type,
                avatar,
                weight,
                change_count: 0,
                submitted_at: now,
            };
            self.votes.insert(voter_id, vote.clone());
            return Ok((VoteOutcome::Recorded, vote));
        };

        if existing.vote_type == vote_type && existing.avatar == avatar {
            return Ok((VoteOutcome::Unchanged, existing.clone()));
        }

        match policy {
            VoteChangePolicy::None => Err(StageError::AlreadyVoted),
            VoteChangePolicy::Limited(limit) if existing.change_count >= limit => {
                Err(StageError::ChangeLimitExceeded { limit })
            }
            _ => {
                existing.vote_type = vote_type;
                existing.avatar = avatar;
                existing.change_count += 1;
                existing.submitted_at = now;
                let outcome = VoteOutcome::Changed {
                    changes_remaining: policy.remaining(existing.change_count),
                };
                Ok((outcome, existing.clone()))
            }
        }
    }

    /// Drop every vote (operator reset with a fresh round).
    pub fn clear(&mut self) {
        self.votes.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn emoji(value: &str) -> Avatar {
        Avatar::Emoji(value.to_string())
    }

    fn submit(
        ledger: &mut VoteLedger,
        voter: VoterId,
        vote_type: VoteType,
        avatar: Avatar,
        policy: VoteChangePolicy,
    ) -> Result<VoteOutcome, StageError> {
        ledger
            .submit(voter, vote_type, avatar, 1, policy, Utc::now())
            .map(|(outcome, _)| outcome)
    }

    #[test]
    fn first_vote_is_recorded() {
        let mut ledger = VoteLedger::new(1);
        let voter = VoterId::new_v4();

        let outcome = submit(
            &mut ledger,
            voter,
            VoteType::Like,
            emoji("😀"),
            VoteChangePolicy::None,
        )
        .unwrap();

        assert_eq!(outcome, VoteOutcome::Recorded);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(&voter).unwrap().change_count, 0);
    }

    #[test]
    fn identical_resubmission_is_a_noop_under_policy_none() {
        let mut ledger = VoteLedger::new(1);
        let voter = VoterId::new_v4();

        submit(
            &mut ledger,
            voter,
            VoteType::Like,
            emoji("😀"),
            VoteChangePolicy::None,
        )
        .unwrap();

        // Client retry-on-timeout: same direction, same avatar.
        let outcome = submit(
            &mut ledger,
            voter,
            VoteType::Like,
            emoji("😀"),
            VoteChangePolicy::None,
        )
        .unwrap();

        assert_eq!(outcome, VoteOutcome::Unchanged);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn differing_vote_fails_under_policy_none() {
        let mut ledger = VoteLedger::new(1);
        let voter = VoterId::new_v4();

        submit(
            &mut ledger,
            voter,
            VoteType::Like,
            emoji("😀"),
            VoteChangePolicy::None,
        )
        .unwrap();

        let err = submit(
            &mut ledger,
            voter,
            VoteType::Dislike,
            emoji("😀"),
            VoteChangePolicy::None,
        )
        .unwrap_err();

        assert!(matches!(err, StageError::AlreadyVoted));
        // The stored vote is untouched.
        assert_eq!(ledger.get(&voter).unwrap().vote_type, VoteType::Like);
    }

    #[test]
    fn limited_policy_allows_exactly_n_changes() {
        let policy = VoteChangePolicy::Limited(2);
        let mut ledger = VoteLedger::new(1);
        let voter = VoterId::new_v4();

        submit(&mut ledger, voter, VoteType::Like, emoji("😀"), policy).unwrap();

        let first = submit(&mut ledger, voter, VoteType::Dislike, emoji("😀"), policy).unwrap();
        assert_eq!(
            first,
            VoteOutcome::Changed {
                changes_remaining: Some(1)
            }
        );

        let second = submit(&mut ledger, voter, VoteType::Like, emoji("🙃"), policy).unwrap();
        assert_eq!(
            second,
            VoteOutcome::Changed {
                changes_remaining: Some(0)
            }
        );

        let err = submit(&mut ledger, voter, VoteType::Dislike, emoji("🙃"), policy).unwrap_err();
        assert!(matches!(err, StageError::ChangeLimitExceeded { limit: 2 }));
    }

    #[test]
    fn change_keeps_original_weight() {
        let mut ledger = VoteLedger::new(1);
        let voter = VoterId::new_v4();
        let now = Utc::now();

        let (_, first) = ledger
            .submit(
                voter,
                VoteType::Like,
                emoji("😀"),
                3,
                VoteChangePolicy::Unlimited,
                now,
            )
            .unwrap();
        assert_eq!(first.weight, 3);
        ledger
            .submit(
                voter,
                VoteType::Dislike,
                emoji("😀"),
                1,
                VoteChangePolicy::Unlimited,
                now,
            )
            .unwrap();

        let vote = ledger.get(&voter).unwrap();
        assert_eq!(vote.weight, 3);
        assert_eq!(vote.vote_type, VoteType::Dislike);
        assert_eq!(vote.change_count, 1);
    }

    #[test]
    fn hydrate_restores_votes_by_voter() {
        let voter = VoterId::new_v4();
        let vote = Vote {
            session_id: 7,
            voter_id: voter,
            vote_type: VoteType::Like,
            avatar: emoji("😀"),
            weight: 1,
            change_count: 1,
            submitted_at: Utc::now(),
        };

        let ledger = VoteLedger::hydrate(7, vec![vote]);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(&voter).unwrap().change_count, 1);
    }

    #[test]
    fn clear_empties_the_ledger() {
        let mut ledger = VoteLedger::new(1);
        submit(
            &mut ledger,
            VoterId::new_v4(),
            VoteType::Like,
            emoji("😀"),
            VoteChangePolicy::None,
        )
        .unwrap();

        ledger.clear();
        assert!(ledger.is_empty());
    }
}
