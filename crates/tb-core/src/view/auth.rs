//! Sign-up, login and logout forms

use super::Banner;
use crate::config::AuthConfig;
use crate::error::{ForumError, Result};
use crate::gateway::{AuthGateway, AuthSession};
use crate::types::is_valid_email;
use std::sync::Arc;
use tracing::info;

pub struct AuthForms {
    auth: Arc<dyn AuthGateway>,
    min_password_length: usize,
    banner: Banner,
}

impl AuthForms {
    pub fn new(auth: Arc<dyn AuthGateway>, config: &AuthConfig) -> Self {
        Self {
            auth,
            min_password_length: config.min_password_length,
            banner: Banner::default(),
        }
    }

    /// Register, then sign straight in
    pub fn sign_up(&mut self, email: &str, password: &str, confirm: &str) -> Result<AuthSession> {
        let result = self.register(email, password, confirm);
        self.banner.capture("Sign up failed", result)
    }

    fn register(&self, email: &str, password: &str, confirm: &str) -> Result<AuthSession> {
        let email = check_email(email)?;
        if password != confirm {
            return Err(ForumError::Validation("Passwords do not match".to_string()));
        }
        if password.chars().count() < self.min_password_length {
            return Err(ForumError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        let user = self.auth.sign_up(email, password)?;
        info!(user = %user.id, "account created");
        self.auth.sign_in(email, password)
    }

    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<AuthSession> {
        let result = self.login(email, password);
        self.banner.capture("Login failed", result)
    }

    fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let email = check_email(email)?;
        if password.is_empty() {
            return Err(ForumError::Validation("Password is required".to_string()));
        }
        self.auth.sign_in(email, password)
    }

    pub fn sign_out(&mut self) -> Result<()> {
        let result = self.auth.sign_out();
        self.banner.capture("Logout failed", result)
    }

    pub fn error(&self) -> Option<&str> {
        self.banner.message()
    }
}

fn check_email(email: &str) -> Result<&str> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(ForumError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionContext;
    use crate::view::fixtures;

    fn forms() -> (AuthForms, SessionContext) {
        let backend = fixtures::backend();
        let session = SessionContext::attach(backend.as_ref()).unwrap();
        let config = AuthConfig {
            min_password_length: 6,
            bcrypt_cost: 4,
        };
        (AuthForms::new(backend, &config), session)
    }

    #[test]
    fn test_sign_up_signs_in() {
        let (mut forms, session) = forms();
        let auth = forms.sign_up("alice@example.com", "hunter22", "hunter22").unwrap();
        assert_eq!(auth.user.username(), "alice");
        assert_eq!(session.email().as_deref(), Some("alice@example.com"));

        forms.sign_out().unwrap();
        assert!(!session.is_signed_in());
        forms.sign_in("alice@example.com", "hunter22").unwrap();
        assert!(session.is_signed_in());
    }

    #[test]
    fn test_sign_up_validation() {
        let (mut forms, session) = forms();

        forms.sign_up("alice@example.com", "hunter22", "hunter23").unwrap_err();
        assert_eq!(forms.error(), Some("Passwords do not match"));

        forms.sign_up("alice@example.com", "abc", "abc").unwrap_err();
        assert_eq!(forms.error(), Some("Password must be at least 6 characters"));

        forms.sign_up("alice", "hunter22", "hunter22").unwrap_err();
        assert_eq!(forms.error(), Some("Please enter a valid email address"));

        assert!(!session.is_signed_in());
    }

    #[test]
    fn test_remote_errors_get_context() {
        let (mut forms, _session) = forms();
        forms.sign_up("alice@example.com", "hunter22", "hunter22").unwrap();
        forms.sign_up("alice@example.com", "hunter22", "hunter22").unwrap_err();
        assert_eq!(forms.error(), Some("Sign up failed: User already registered"));

        forms.sign_in("alice@example.com", "wrong-password").unwrap_err();
        assert_eq!(forms.error(), Some("Login failed: Invalid login credentials"));
    }
}
