//! The swipe-to-vote gesture contract.
//!
//! The gesture is a 1-D drag: positive offsets lean toward like, negative
//! toward dislike. A direction is latched only once the offset crosses the
//! commit distance; releasing below it springs back with no vote, and a
//! committed tracker never commits again.

use crate::vote::VoteType;

/// What happens when the finger lifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeRelease {
    /// The offset was past the commit distance; this direction is the vote.
    Committed(VoteType),
    /// Below the commit distance: reset to center, no vote.
    SpringBack,
}

/// Tracks one swipe interaction.
#[derive(Debug)]
pub struct SwipeTracker {
    commit_distance: f64,
    offset: f64,
    committed: bool,
}

impl SwipeTracker {
    pub fn new(commit_distance: f64) -> Self {
        Self {
            commit_distance,
            offset: 0.0,
            committed: false,
        }
    }

    /// Move the drag to an absolute offset.
    ///
    /// Returns the direction that would commit if released now; `None`
    /// below the commit distance. After a commit the tracker is inert.
    pub fn drag(&mut self, offset: f64) -> Option<VoteType> {
        if self.committed {
            return None;
        }
        self.offset = offset;
        self.pending()
    }

    /// The direction currently past the commit distance, if any.
    pub fn pending(&self) -> Option<VoteType> {
        if self.committed || self.offset.abs() < self.commit_distance {
            return None;
        }
        Some(if self.offset > 0.0 {
            VoteType::Like
        } else {
            VoteType::Dislike
        })
    }

    /// Lift the finger.
    pub fn release(&mut self) -> SwipeRelease {
        match self.pending() {
            Some(direction) => {
                self.committed = true;
                self.offset = 0.0;
                SwipeRelease::Committed(direction)
            }
            None => {
                self.offset = 0.0;
                SwipeRelease::SpringBack
            }
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Once true the tracker never emits another commit; the flow must be
    /// reconciled against the server record before a fresh attempt.
    pub fn has_committed(&self) -> bool {
        self.committed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_direction_below_commit_distance() {
        let mut swipe = SwipeTracker::new(80.0);
        assert_eq!(swipe.drag(40.0), None);
        assert_eq!(swipe.drag(-79.9), None);
    }

    #[test]
    fn direction_latches_past_the_distance() {
        let mut swipe = SwipeTracker::new(80.0);
        assert_eq!(swipe.drag(80.0), Some(VoteType::Like));
        assert_eq!(swipe.drag(-120.0), Some(VoteType::Dislike));
    }

    #[test]
    fn release_below_distance_springs_back() {
        let mut swipe = SwipeTracker::new(80.0);
        swipe.drag(50.0);

        assert_eq!(swipe.release(), SwipeRelease::SpringBack);
        assert_eq!(swipe.offset(), 0.0);
        assert!(!swipe.has_committed());
    }

    #[test]
    fn release_past_distance_commits() {
        let mut swipe = SwipeTracker::new(80.0);
        swipe.drag(-95.0);

        assert_eq!(swipe.release(), SwipeRelease::Committed(VoteType::Dislike));
        assert!(swipe.has_committed());
    }

    #[test]
    fn committed_tracker_never_commits_again() {
        let mut swipe = SwipeTracker::new(80.0);
        swipe.drag(100.0);
        assert_eq!(swipe.release(), SwipeRelease::Committed(VoteType::Like));

        // A stray drag after commit (e.g. re-entering the voting step
        // after a reload) must not produce a second vote.
        assert_eq!(swipe.drag(150.0), None);
        assert_eq!(swipe.release(), SwipeRelease::SpringBack);
    }
}
