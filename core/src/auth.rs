//! Demo login gate.
//!
//! A single configured account is accepted. Registration is validated and
//! then discarded; nothing is persisted.

use chrono::{DateTime, Local};
use kalium_common::config::Credentials;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please enter both username and password")]
    MissingCredentials,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Please fill in all fields")]
    IncompleteRegistration,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub signed_in_at: DateTime<Local>,
}

#[derive(Clone, Debug, Default)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct LoginGate {
    credentials: Credentials,
}

impl LoginGate {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if username != self.credentials.username || password != self.credentials.password {
            warn!(%username, "Rejected login");
            return Err(AuthError::InvalidCredentials);
        }
        info!(%username, "Signed in");
        Ok(Session {
            username: username.to_string(),
            signed_in_at: Local::now(),
        })
    }

    /// Checks a sign-up form. Accepted registrations are not stored.
    pub fn validate_registration(&self, form: &Registration) -> Result<(), AuthError> {
        let fields = [
            &form.email,
            &form.username,
            &form.password,
            &form.confirm_password,
        ];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(AuthError::IncompleteRegistration);
        }
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(())
    }
}

/// What the login screen shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthView {
    Login { error: Option<String> },
    Authenticated(Session),
}

impl Default for AuthView {
    fn default() -> Self {
        AuthView::Login { error: None }
    }
}

impl AuthView {
    /// Applies one login attempt. An authenticated view ignores further attempts.
    pub fn submit(self, gate: &LoginGate, username: &str, password: &str) -> Self {
        match self {
            AuthView::Authenticated(_) => self,
            AuthView::Login { .. } => match gate.authenticate(username, password) {
                Ok(session) => AuthView::Authenticated(session),
                Err(e) => AuthView::Login {
                    error: Some(e.to_string()),
                },
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthView::Authenticated(_))
    }
}
