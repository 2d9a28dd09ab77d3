//! Error types for threadboard

use thiserror::Error;

/// Main error type for threadboard
#[derive(Debug, Error)]
pub enum ForumError {
    /// Input rejected before any gateway call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Failure reported by a data or auth gateway
    #[error("Remote error: {0}")]
    Remote(String),

    /// Requested post or comment no longer exists
    #[error("Not found: {0}")]
    NotFound(String),

    /// Action requires a signed-in user
    #[error("You must be logged in to {0}")]
    Unauthenticated(String),

    /// Action on a record owned by someone else
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unsupported schema version
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchemaVersion(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ForumError>,
    },
}

impl ForumError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ForumError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any context wrappers
    pub fn root(&self) -> &ForumError {
        match self {
            ForumError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Message shown in a view's error banner
    ///
    /// Gateway failures keep the provider's message, prefixed by whatever
    /// context the view attached ("Failed to add comment: ...").
    pub fn user_message(&self) -> String {
        match self {
            ForumError::Validation(msg)
            | ForumError::Remote(msg)
            | ForumError::PermissionDenied(msg) => msg.clone(),
            ForumError::NotFound(what) => format!("{} not found", what),
            ForumError::WithContext { context, source } => {
                format!("{}: {}", context, source.user_message())
            }
            other => other.to_string(),
        }
    }

    /// Check whether this is (or wraps) a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), ForumError::NotFound(_))
    }
}

/// Result type alias for threadboard
pub type Result<T> = std::result::Result<T, ForumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForumError::NotFound("Post 7".to_string());
        assert_eq!(err.to_string(), "Not found: Post 7");
    }

    #[test]
    fn test_error_with_context() {
        let err = ForumError::Remote("duplicate key".to_string());
        let err = err.with_context("Failed to upvote post");
        assert!(err.to_string().contains("Failed to upvote post"));
        assert_eq!(err.user_message(), "Failed to upvote post: duplicate key");
    }

    #[test]
    fn test_root_and_not_found() {
        let err = ForumError::NotFound("Comment 3".to_string()).with_context("Loading");
        assert!(err.is_not_found());
        assert!(!ForumError::Remote("x".to_string()).is_not_found());
    }

    #[test]
    fn test_unauthenticated_message() {
        let err = ForumError::Unauthenticated("comment".to_string());
        assert_eq!(err.user_message(), "You must be logged in to comment");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ForumError = io_err.into();
        assert!(matches!(err, ForumError::Io(_)));
    }
}
