//! Session state machine
//!
//! A session is either a guest or an authenticated user. Backend
//! credentials are only reachable through [`SessionState::credentials`],
//! so a guest session cannot issue personal-library calls.

use std::fmt;

use tracing::{debug, info};

use crate::credentials::SavedLogin;
use crate::gateway::Backend;

/// Display name used for guest sessions
pub const GUEST_NAME: &str = "Guest";

/// Credentials attached to every authenticated backend call
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user_id: String,
    password: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Current session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Guest,
    Authenticated {
        username: String,
        credentials: Credentials,
    },
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    /// Backend credentials, `None` for guests
    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            SessionState::Guest => None,
            SessionState::Authenticated { credentials, .. } => Some(credentials),
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            SessionState::Guest => None,
            SessionState::Authenticated { username, .. } => Some(username),
        }
    }

    /// Username, or "Guest"
    pub fn display_name(&self) -> &str {
        self.username().unwrap_or(GUEST_NAME)
    }
}

/// Result of a login or registration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success {
        username: String,
        user_id: String,
        message: Option<String>,
    },
    Failure,
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthKind {
    Login,
    Register,
}

/// Owns the session state and the one-shot auto-login flag
#[derive(Debug, Default)]
pub struct SessionManager {
    state: SessionState,
    auto_login_attempted: bool,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn auto_login_attempted(&self) -> bool {
        self.auto_login_attempted
    }

    /// Log in. On failure the current state is kept.
    pub fn login<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        username: &str,
        password: &str,
    ) -> AuthOutcome {
        self.authenticate(AuthKind::Login, backend, username, password)
    }

    /// Create an account and log into it
    pub fn register<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        username: &str,
        password: &str,
    ) -> AuthOutcome {
        self.authenticate(AuthKind::Register, backend, username, password)
    }

    /// Log in with saved credentials, at most once per process
    ///
    /// Returns `None` when no attempt was made.
    pub fn auto_login<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        saved: Option<&SavedLogin>,
    ) -> Option<AuthOutcome> {
        if self.auto_login_attempted {
            return None;
        }
        self.auto_login_attempted = true;

        let saved = saved?;
        debug!("Attempting auto-login for '{}'", saved.username);
        Some(self.login(backend, &saved.username, &saved.password))
    }

    /// Return to a guest session, dropping the password
    pub fn logout(&mut self) {
        if let Some(username) = self.state.username() {
            info!("Logged out '{}'", username);
        }
        self.state = SessionState::Guest;
    }

    fn authenticate<B: Backend + ?Sized>(
        &mut self,
        kind: AuthKind,
        backend: &B,
        username: &str,
        password: &str,
    ) -> AuthOutcome {
        let reply = match kind {
            AuthKind::Login => backend.login(username, password),
            AuthKind::Register => backend.register(username, password),
        };

        let Some(reply) = reply else {
            debug!("{:?} failed for '{}'", kind, username);
            return AuthOutcome::Failure;
        };

        info!("{:?} succeeded for '{}'", kind, username);
        self.state = SessionState::Authenticated {
            username: username.to_string(),
            credentials: Credentials::new(reply.user_id.clone(), password),
        };

        AuthOutcome::Success {
            username: username.to_string(),
            user_id: reply.user_id,
            message: reply.message,
        }
    }
}
