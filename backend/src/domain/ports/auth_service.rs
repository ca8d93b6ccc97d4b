//! Driving port for sign-up, login and token authentication.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate callers without importing the token store or the hasher.

use async_trait::async_trait;

use crate::domain::{AuthToken, Error, LoginCredentials, User, UserDraft};

/// Result of a logout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// The caller's token was deleted.
    LoggedOut,
    /// No valid token was presented.
    Anonymous,
}

impl LogoutOutcome {
    /// Message returned to the caller.
    pub const fn message(self) -> &'static str {
        match self {
            Self::LoggedOut => "You have successfully logged out.",
            Self::Anonymous => "Goodbye",
        }
    }
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a regular user.
    async fn sign_up(&self, draft: UserDraft) -> Result<User, Error>;

    /// Check credentials and return the user's token, creating it if needed.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;

    /// Revoke the presented token, if any.
    async fn logout(&self, token: Option<AuthToken>) -> Result<LogoutOutcome, Error>;

    /// Resolve a token to an active user; `unauthorized` otherwise.
    async fn authenticate(&self, token: &AuthToken) -> Result<User, Error>;
}
