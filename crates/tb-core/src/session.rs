//! Signed-in user shared across views
//!
//! A `SessionContext` is created once, cloned into every view, and kept
//! current by draining the auth provider's session events on each read.

use crate::error::{ForumError, Result};
use crate::gateway::{AuthEvent, AuthGateway, AuthUser};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct SessionState {
    user: Option<AuthUser>,
    events: Option<Receiver<AuthEvent>>,
}

impl SessionState {
    fn sync(&mut self) {
        let Some(events) = &self.events else {
            return;
        };
        for event in events.try_iter() {
            match event {
                AuthEvent::SignedIn(session) => {
                    debug!(user = %session.user.id, "session changed: signed in");
                    self.user = Some(session.user);
                }
                AuthEvent::SignedOut => {
                    debug!("session changed: signed out");
                    self.user = None;
                }
            }
        }
    }
}

/// Handle on the current user; clones share state
#[derive(Clone, Default)]
pub struct SessionContext {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionContext {
    /// A context with nobody signed in and no provider attached
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A fixed context for `user`
    pub fn with_user(user: AuthUser) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionState {
                user: Some(user),
                events: None,
            })),
        }
    }

    /// Follow the provider's current session and later session changes
    pub fn attach(auth: &dyn AuthGateway) -> Result<Self> {
        // Subscribe first so a change racing the lookup is not lost
        let events = auth.subscribe();
        let user = auth.current_session()?.map(|session| session.user);
        Ok(Self {
            inner: Arc::new(Mutex::new(SessionState {
                user,
                events: Some(events),
            })),
        })
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        let mut state = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.sync();
        state
    }

    /// The signed-in user, if any
    pub fn user(&self) -> Option<AuthUser> {
        self.state().user.clone()
    }

    /// Email of the signed-in user
    pub fn email(&self) -> Option<String> {
        self.state().user.as_ref().map(|u| u.email.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.state().user.is_some()
    }

    /// The signed-in user, or `Unauthenticated` naming `action`
    pub fn require_user(&self, action: &str) -> Result<AuthUser> {
        self.user()
            .ok_or_else(|| ForumError::Unauthenticated(action.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::gateway::MemoryBackend;

    fn backend() -> MemoryBackend {
        MemoryBackend::new().with_auth_config(AuthConfig {
            min_password_length: 6,
            bcrypt_cost: 4,
        })
    }

    #[test]
    fn test_anonymous_requires_login() {
        let session = SessionContext::anonymous();
        assert!(!session.is_signed_in());
        let err = session.require_user("vote").unwrap_err();
        assert_eq!(err.user_message(), "You must be logged in to vote");
    }

    #[test]
    fn test_attached_context_follows_events() {
        let backend = backend();
        backend.sign_up("alice@example.com", "hunter22").unwrap();
        let session = SessionContext::attach(&backend).unwrap();
        let view_copy = session.clone();
        assert!(session.user().is_none());

        backend.sign_in("alice@example.com", "hunter22").unwrap();
        assert_eq!(view_copy.email().as_deref(), Some("alice@example.com"));
        assert_eq!(session.require_user("comment").unwrap().username(), "alice");

        backend.sign_out().unwrap();
        assert!(!view_copy.is_signed_in());
    }

    #[test]
    fn test_attach_picks_up_existing_session() {
        let backend = backend();
        backend.sign_up("bob@example.com", "hunter22").unwrap();
        backend.sign_in("bob@example.com", "hunter22").unwrap();

        let session = SessionContext::attach(&backend).unwrap();
        assert_eq!(session.email().as_deref(), Some("bob@example.com"));
    }
}
