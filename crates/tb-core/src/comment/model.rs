//! Comment data models

use crate::types::{CommentId, PostId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A comment on a post, possibly replying to another comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment identifier
    pub id: CommentId,
    /// Comment this one replies to, `None` for top-level comments
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    /// Post the comment belongs to
    pub post_id: PostId,
    /// Author email
    pub user_email: String,
    /// Comment text
    pub content: String,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Check if this comment replies to another one
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Check if `email` wrote this comment
    pub fn is_authored_by(&self, email: &str) -> bool {
        self.user_email == email
    }
}

/// Payload for inserting a comment; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: PostId,
    pub user_email: String,
    pub content: String,
    pub parent_id: Option<CommentId>,
}

/// Order of top-level comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Most recent first
    #[default]
    #[serde(rename = "newest")]
    NewestFirst,
    /// Oldest first
    #[serde(rename = "oldest")]
    OldestFirst,
}

impl SortOrder {
    /// Whether fetches should ask the store for ascending timestamps
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortOrder::OldestFirst)
    }

    /// Short name used in config and CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "newest",
            SortOrder::OldestFirst => "oldest",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = crate::ForumError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "newest" | "newest-first" | "newest_first" => Ok(SortOrder::NewestFirst),
            "oldest" | "oldest-first" | "oldest_first" => Ok(SortOrder::OldestFirst),
            other => Err(crate::ForumError::Validation(format!(
                "Unknown comment order '{}' (expected 'newest' or 'oldest')",
                other
            ))),
        }
    }
}
