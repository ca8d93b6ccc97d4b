//! Authentication service: sign-up, login, logout and token resolution.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    AuthService, AuthTokenRepository, AuthTokenRepositoryError, LogoutOutcome, PasswordHasher,
    UserRepository,
};
use crate::domain::user_service::{insert_user, map_hash_error, map_user_repository_error};
use crate::domain::{AuthToken, Error, LoginCredentials, Role, User, UserDraft};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_TOKEN: &str = "Invalid token.";
const INACTIVE_USER: &str = "User inactive or deleted.";

fn map_token_repository_error(error: AuthTokenRepositoryError) -> Error {
    match error {
        AuthTokenRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("token repository unavailable: {message}"))
        }
        AuthTokenRepositoryError::Query { message } => {
            Error::internal(format!("token repository error: {message}"))
        }
    }
}

/// Authentication service implementing the [`AuthService`] port.
#[derive(Clone)]
pub struct AuthenticationService<U, T, H> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
}

impl<U, T, H> AuthenticationService<U, T, H> {
    pub fn new(users: Arc<U>, tokens: Arc<T>, hasher: Arc<H>) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }
}

#[async_trait]
impl<U, T, H> AuthService for AuthenticationService<U, T, H>
where
    U: UserRepository,
    T: AuthTokenRepository,
    H: PasswordHasher,
{
    async fn sign_up(&self, mut draft: UserDraft) -> Result<User, Error> {
        draft.role = Role::Regular;
        draft.is_active = true;
        let user = insert_user(self.users.as_ref(), self.hasher.as_ref(), draft).await?;
        info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let stored = self
            .users
            .find_credentials(credentials.username())
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(map_hash_error)?;
        if !matches || !stored.user.is_active {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let token = self
            .tokens
            .issue(stored.user.id, &AuthToken::generate())
            .await
            .map_err(map_token_repository_error)?;
        info!(user_id = %stored.user.id, "user logged in");
        Ok(token)
    }

    async fn logout(&self, token: Option<AuthToken>) -> Result<LogoutOutcome, Error> {
        let Some(token) = token else {
            return Ok(LogoutOutcome::Anonymous);
        };
        let revoked = self
            .tokens
            .revoke(&token)
            .await
            .map_err(map_token_repository_error)?;
        Ok(if revoked {
            info!("token revoked");
            LogoutOutcome::LoggedOut
        } else {
            LogoutOutcome::Anonymous
        })
    }

    async fn authenticate(&self, token: &AuthToken) -> Result<User, Error> {
        let user = self
            .tokens
            .find_user(token)
            .await
            .map_err(map_token_repository_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_TOKEN))?;
        if !user.is_active {
            return Err(Error::unauthorized(INACTIVE_USER));
        }
        Ok(user)
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
