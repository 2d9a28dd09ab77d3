//! Core type definitions for threadboard

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a post, assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = crate::ForumError;

    fn from_str(s: &str) -> crate::Result<Self> {
        s.trim()
            .parse()
            .map(PostId)
            .map_err(|_| crate::ForumError::Validation(format!("Invalid post ID: {}", s)))
    }
}

/// Identifier of a comment, assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CommentId {
    type Err = crate::ForumError;

    fn from_str(s: &str) -> crate::Result<Self> {
        s.trim()
            .parse()
            .map(CommentId)
            .map_err(|_| crate::ForumError::Validation(format!("Invalid comment ID: {}", s)))
    }
}

/// Identifier of a registered account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new UserId
    pub fn new() -> Self {
        UserId(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token of a signed-in session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthToken(pub Uuid);

impl AuthToken {
    /// Generate a new token
    pub fn generate() -> Self {
        AuthToken(Uuid::new_v4())
    }
}

/// Schema version of persisted snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub const V1_0: Self = Self { major: 1, minor: 0 };

    /// Check if this version is compatible with another version
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.major == other.major
    }

    /// Parse "major.minor"
    pub fn parse(s: &str) -> Option<Self> {
        let (major, minor) = s.split_once('.')?;
        Some(SchemaVersion {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::V1_0
    }
}

/// Display name derived from an email: the part before `@`
pub fn username_from_email(email: &str) -> &str {
    match email.split('@').next() {
        Some(name) if !email.is_empty() => name,
        _ => "Anonymous",
    }
}

/// Loose shape check: one `@` with text on both sides and a dot in the domain
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_id_parse() {
        assert_eq!("42".parse::<PostId>().unwrap(), PostId(42));
        assert_eq!(" 7 ".parse::<PostId>().unwrap(), PostId(7));
        assert!("abc".parse::<PostId>().is_err());
    }

    #[test]
    fn test_comment_id_parse() {
        assert_eq!("3".parse::<CommentId>().unwrap(), CommentId(3));
        assert!("".parse::<CommentId>().is_err());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&PostId(5)).unwrap(), "5");
        let id: CommentId = serde_json::from_str("9").unwrap();
        assert_eq!(id, CommentId(9));
    }

    #[test]
    fn test_user_id_uniqueness() {
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn test_schema_version() {
        let v1_0 = SchemaVersion::V1_0;
        let v1_1 = SchemaVersion::parse("1.1").unwrap();
        let v2_0 = SchemaVersion::parse("2.0").unwrap();

        assert!(v1_0.is_compatible(&v1_1));
        assert!(!v1_0.is_compatible(&v2_0));
        assert!(SchemaVersion::parse("1").is_none());
        assert_eq!(v1_1.to_string(), "1.1");
    }

    #[test]
    fn test_username_from_email() {
        assert_eq!(username_from_email("alice@example.com"), "alice");
        assert_eq!(username_from_email("bob"), "bob");
        assert_eq!(username_from_email(""), "Anonymous");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@localhost"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }
}
