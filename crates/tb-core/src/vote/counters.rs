//! Applying vote deltas to stored counters

use super::model::VoteDelta;
use crate::post::Post;
use serde::{Deserialize, Serialize};

/// A post's aggregate vote tallies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteCounters {
    pub upvotes: u64,
    pub downvotes: u64,
}

impl VoteCounters {
    pub fn of(post: &Post) -> Self {
        Self {
            upvotes: post.upvotes,
            downvotes: post.downvotes,
        }
    }

    /// Apply `delta`, flooring each counter at zero
    ///
    /// Stale or duplicated vote state can ask for a decrement of a counter
    /// that is already zero; the counter then stays at zero.
    pub fn apply(self, delta: VoteDelta) -> Self {
        Self {
            upvotes: self.upvotes.saturating_add_signed(delta.upvotes),
            downvotes: self.downvotes.saturating_add_signed(delta.downvotes),
        }
    }
}
