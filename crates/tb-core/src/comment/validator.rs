//! Comment validation

use crate::error::{ForumError, Result};

/// Maximum comment length (default)
pub const MAX_COMMENT_LENGTH: usize = 10000;

/// Validator for comment text
#[derive(Debug, Clone, Copy)]
pub struct CommentValidator {
    max_length: usize,
}

impl CommentValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self {
            max_length: MAX_COMMENT_LENGTH,
        }
    }

    /// Create a new validator with custom max length
    pub fn with_max_length(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Validate comment content, returning the trimmed text to store
    pub fn validate_content<'a>(&self, content: &'a str) -> Result<&'a str> {
        let trimmed = content.trim();

        if trimmed.is_empty() {
            return Err(ForumError::Validation(
                "Comment cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > self.max_length {
            return Err(ForumError::Validation(format!(
                "Comment exceeds maximum length of {} characters",
                self.max_length
            )));
        }

        Ok(trimmed)
    }
}

impl Default for CommentValidator {
    fn default() -> Self {
        Self::new()
    }
}
