//! The voter wall: a capped, display-facing view of who has voted.

use serde::Serialize;

use crate::avatar::Avatar;
use crate::types::VoterId;
use crate::vote::{Vote, VoteType};

/// One voter's tile on the wall.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterPresenceEntry {
    pub voter_id: VoterId,
    pub avatar: Avatar,
    pub vote_type: VoteType,
    pub is_judge: bool,
    /// Stable insertion position; the wall never reorders.
    pub order: u32,
}

/// Deduplicated, insertion-ordered list of voters, capped to the number of
/// tiles the display can show.
///
/// A vote change updates the existing entry in place (avatar and
/// direction) without moving it. Voters beyond the cap are counted in the
/// aggregate but get no tile.
#[derive(Debug)]
pub struct VoterWall {
    max_visible: usize,
    entries: Vec<VoterPresenceEntry>,
}

impl VoterWall {
    pub fn new(max_visible: usize) -> Self {
        Self {
            max_visible,
            entries: Vec::new(),
        }
    }

    /// Rebuild from persisted votes; `votes` must already be in submission
    /// order.
    pub fn hydrate<'a, I>(max_visible: usize, votes: I) -> Self
    where
        I: IntoIterator<Item = &'a Vote>,
    {
        let mut wall = Self::new(max_visible);
        for vote in votes {
            wall.observe(vote);
        }
        wall
    }

    /// Fold one committed or changed vote into the wall.
    pub fn observe(&mut self, vote: &Vote) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.voter_id == vote.voter_id)
        {
            entry.avatar = vote.avatar.clone();
            entry.vote_type = vote.vote_type;
            return;
        }

        if self.entries.len() >= self.max_visible {
            return;
        }

        let order = self.entries.len() as u32;
        self.entries.push(VoterPresenceEntry {
            voter_id: vote.voter_id,
            avatar: vote.avatar.clone(),
            vote_type: vote.vote_type,
            is_judge: vote.is_judge(),
            order,
        });
    }

    pub fn entries(&self) -> &[VoterPresenceEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
