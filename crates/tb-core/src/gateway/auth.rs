//! Authentication gateway abstractions

use crate::error::Result;
use crate::types::{username_from_email, AuthToken, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;

/// Identity exposed by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

impl AuthUser {
    /// Display name derived from the email
    pub fn username(&self) -> &str {
        username_from_email(&self.email)
    }
}

/// A signed-in session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: AuthToken,
    pub user: AuthUser,
    pub created_at: DateTime<Utc>,
}

/// Session change broadcast to auth subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthSession),
    SignedOut,
}

/// Sign-up, sign-in and session tracking
pub trait AuthGateway: Send + Sync {
    /// Register an account; does not sign it in
    fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Verify credentials and make the account the current session
    fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// End the current session, if any
    fn sign_out(&self) -> Result<()>;

    /// The current session
    fn current_session(&self) -> Result<Option<AuthSession>>;

    /// Receive every later session change
    fn subscribe(&self) -> Receiver<AuthEvent>;
}
