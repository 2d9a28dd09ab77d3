//! Vote data models

use crate::types::PostId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a vote, as requested by a user and as stored in `PostVotes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Upvote,
    Downvote,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Upvote => "upvote",
            VoteKind::Downvote => "downvote",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteKind {
    type Err = crate::ForumError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "up" | "upvote" => Ok(VoteKind::Upvote),
            "down" | "downvote" => Ok(VoteKind::Downvote),
            other => Err(crate::ForumError::Validation(format!(
                "Unknown vote '{}' (expected 'up' or 'down')",
                other
            ))),
        }
    }
}

/// The calling user's current relationship to one post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoteState {
    #[default]
    None,
    Upvoted,
    Downvoted,
}

impl VoteState {
    /// The stored vote type matching this state
    pub fn kind(&self) -> Option<VoteKind> {
        match self {
            VoteState::None => None,
            VoteState::Upvoted => Some(VoteKind::Upvote),
            VoteState::Downvoted => Some(VoteKind::Downvote),
        }
    }
}

impl From<Option<VoteKind>> for VoteState {
    fn from(kind: Option<VoteKind>) -> Self {
        match kind {
            None => VoteState::None,
            Some(VoteKind::Upvote) => VoteState::Upvoted,
            Some(VoteKind::Downvote) => VoteState::Downvoted,
        }
    }
}

/// Signed adjustment of a post's counters, each field in `{-1, 0, 1}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VoteDelta {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VoteDelta {
    pub const fn new(upvotes: i64, downvotes: i64) -> Self {
        Self { upvotes, downvotes }
    }

    /// Field-wise sum
    pub fn combine(self, other: VoteDelta) -> VoteDelta {
        VoteDelta::new(self.upvotes + other.upvotes, self.downvotes + other.downvotes)
    }

    pub fn is_zero(&self) -> bool {
        self.upvotes == 0 && self.downvotes == 0
    }
}

/// A row of the `PostVotes` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub id: i64,
    pub post_id: PostId,
    pub user_email: String,
    pub vote_type: VoteKind,
}

/// Payload for inserting a vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVote {
    pub post_id: PostId,
    pub user_email: String,
    pub vote_type: VoteKind,
}
