//! Post data models

use crate::types::PostId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A forum post with its aggregate vote counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique post identifier
    pub id: PostId,
    /// Post title
    pub title: String,
    /// Post body
    pub description: String,
    /// Author email
    pub author: String,
    /// Upvote tally
    #[serde(default)]
    pub upvotes: u64,
    /// Downvote tally
    #[serde(default)]
    pub downvotes: u64,
    /// When the post was created
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Check if `email` wrote this post
    pub fn is_authored_by(&self, email: &str) -> bool {
        self.author == email
    }

    /// Upvotes minus downvotes
    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}

/// Payload for inserting a post; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub description: String,
    pub author: String,
    pub upvotes: u64,
    pub downvotes: u64,
}

/// Editable fields of an existing post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostChanges {
    pub title: String,
    pub description: String,
}
