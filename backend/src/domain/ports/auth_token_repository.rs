//! Port for API token storage.
use async_trait::async_trait;

use crate::domain::{AuthToken, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token repository adapters.
    pub enum AuthTokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

/// Port for issuing, resolving and revoking per-user API tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    /// Return the user's token, storing `candidate` when none exists yet.
    async fn issue(
        &self,
        user_id: UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, AuthTokenRepositoryError>;

    /// Resolve a token to its owner.
    async fn find_user(&self, token: &AuthToken) -> Result<Option<User>, AuthTokenRepositoryError>;

    /// Delete a token; `false` when it was unknown.
    async fn revoke(&self, token: &AuthToken) -> Result<bool, AuthTokenRepositoryError>;
}
