//! Builder for comment insert payloads

use super::model::NewComment;
use super::validator::CommentValidator;
use crate::error::{ForumError, Result};
use crate::types::{CommentId, PostId};

/// Builder for creating comments with fluent API
pub struct CommentBuilder {
    post_id: PostId,
    author: Option<String>,
    content: Option<String>,
    parent_id: Option<CommentId>,
    validator: CommentValidator,
}

impl CommentBuilder {
    /// Create a new builder for a top-level comment on `post_id`
    pub fn new(post_id: PostId) -> Self {
        Self {
            post_id,
            author: None,
            content: None,
            parent_id: None,
            validator: CommentValidator::new(),
        }
    }

    /// Set the author email
    pub fn author(mut self, email: impl Into<String>) -> Self {
        self.author = Some(email.into());
        self
    }

    /// Set the comment content
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Make this comment a reply
    pub fn reply_to(mut self, parent_id: CommentId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Use a validator with custom limits
    pub fn validator(mut self, validator: CommentValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Build the payload; content is stored trimmed
    pub fn build(self) -> Result<NewComment> {
        let author = self
            .author
            .ok_or_else(|| ForumError::Unauthenticated("comment".to_string()))?;

        let content = self
            .content
            .ok_or_else(|| ForumError::Validation("Comment content is required".to_string()))?;
        let content = self.validator.validate_content(&content)?.to_string();

        Ok(NewComment {
            post_id: self.post_id,
            user_email: author,
            content,
            parent_id: self.parent_id,
        })
    }
}
