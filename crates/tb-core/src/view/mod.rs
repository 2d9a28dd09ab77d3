//! View module
//!
//! Views own gateway I/O and session lookups for one screen of the forum.
//! Every action returns its `Result` and also records a banner message, so a
//! failed action leaves the view's local model as it was before the attempt.

pub mod auth;
pub mod comments;
pub mod detail;
pub mod editor;
pub mod list;

pub use auth::AuthForms;
pub use comments::CommentsView;
pub use detail::{PostDetailView, PostState};
pub use editor::PostEditor;
pub use list::PostListView;

use crate::error::{ForumError, Result};
use crate::gateway::AuthUser;

/// Answer to a destructive action's confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Error message shown above a view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner {
    message: Option<String>,
}

impl Banner {
    /// Record the outcome of an action: errors set the message, success clears it
    ///
    /// Gateway failures get `context` prepended; other errors already read
    /// as a complete sentence.
    pub fn capture<T>(&mut self, context: &str, result: Result<T>) -> Result<T> {
        let result = result.map_err(|err| match err {
            ForumError::Remote(_) => err.with_context(context),
            other => other,
        });
        self.message = result.as_ref().err().map(ForumError::user_message);
        result
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn clear(&mut self) {
        self.message = None;
    }
}

pub(crate) fn ensure_author(author: &str, user: &AuthUser, what: &str) -> Result<()> {
    if author == user.email {
        Ok(())
    } else {
        Err(ForumError::PermissionDenied(format!(
            "Only the author can change this {}",
            what
        )))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::config::AuthConfig;
    use crate::gateway::{AuthGateway, MemoryBackend};
    use crate::session::SessionContext;
    use std::sync::Arc;

    pub const PASSWORD: &str = "hunter22";

    pub fn backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new().with_auth_config(AuthConfig {
            min_password_length: 6,
            bcrypt_cost: 4,
        }))
    }

    /// Register `email` and return a context following the backend's session
    pub fn register(backend: &MemoryBackend, email: &str) -> SessionContext {
        backend.sign_up(email, PASSWORD).unwrap();
        SessionContext::attach(backend).unwrap()
    }

    pub fn sign_in(backend: &MemoryBackend, email: &str) {
        backend.sign_in(email, PASSWORD).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_captures_and_clears() {
        let mut banner = Banner::default();

        let failed: Result<()> =
            banner.capture("Failed to add comment", Err(ForumError::Remote("timeout".into())));
        assert!(failed.is_err());
        assert_eq!(banner.message(), Some("Failed to add comment: timeout"));

        let _ = banner.capture("Failed to add comment", Ok(()));
        assert_eq!(banner.message(), None);
    }

    #[test]
    fn test_banner_keeps_validation_text() {
        let mut banner = Banner::default();
        let _ = banner.capture::<()>(
            "Failed to add comment",
            Err(ForumError::Validation("Comment cannot be empty".into())),
        );
        assert_eq!(banner.message(), Some("Comment cannot be empty"));
    }

    #[test]
    fn test_confirmation_from_bool() {
        assert_eq!(Confirmation::from(true), Confirmation::Confirmed);
        assert_eq!(Confirmation::from(false), Confirmation::Declined);
    }
}
