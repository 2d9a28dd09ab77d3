//! Post validation

use crate::config::PostsConfig;
use crate::error::{ForumError, Result};

/// Validator for post title and description
#[derive(Debug, Clone, Copy)]
pub struct PostValidator {
    max_title_length: usize,
    max_description_length: usize,
}

impl PostValidator {
    /// Create a validator from post configuration
    pub fn new(config: &PostsConfig) -> Self {
        Self {
            max_title_length: config.max_title_length,
            max_description_length: config.max_description_length,
        }
    }

    /// Validate both fields, returning them trimmed
    pub fn validate<'a>(&self, title: &'a str, description: &'a str) -> Result<(&'a str, &'a str)> {
        let title = title.trim();
        let description = description.trim();

        if title.is_empty() {
            return Err(ForumError::Validation("Title is required".to_string()));
        }
        if description.is_empty() {
            return Err(ForumError::Validation("Description is required".to_string()));
        }
        if title.chars().count() > self.max_title_length {
            return Err(ForumError::Validation(format!(
                "Title exceeds maximum length of {} characters",
                self.max_title_length
            )));
        }
        if description.chars().count() > self.max_description_length {
            return Err(ForumError::Validation(format!(
                "Description exceeds maximum length of {} characters",
                self.max_description_length
            )));
        }

        Ok((title, description))
    }
}

impl Default for PostValidator {
    fn default() -> Self {
        Self::new(&PostsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_post() {
        let validator = PostValidator::default();
        assert_eq!(
            validator.validate(" Title ", "Body\n").unwrap(),
            ("Title", "Body")
        );
    }

    #[test]
    fn test_required_fields() {
        let validator = PostValidator::default();
        assert!(validator.validate("", "Body").is_err());
        assert!(validator.validate("Title", "   ").is_err());
    }

    #[test]
    fn test_title_too_long() {
        let validator = PostValidator::new(&PostsConfig {
            max_title_length: 5,
            ..PostsConfig::default()
        });
        assert!(validator.validate("Short", "Body").is_ok());
        assert!(validator.validate("Too long", "Body").is_err());
    }
}
