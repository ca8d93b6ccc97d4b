//! Bcrypt implementation of the password hashing port.
//!
//! Bcrypt is CPU bound, so both operations run on Tokio's blocking pool.

use async_trait::async_trait;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{Password, PasswordHash};

/// Hashes passwords with bcrypt at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hasher using `cost` rounds (bcrypt accepts 4 to 31).
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

fn join_error(err: tokio::task::JoinError) -> PasswordHashError {
    PasswordHashError::hashing(format!("task join error: {err}"))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let secret = Zeroizing::new(password.expose().to_owned());
        let cost = self.cost;
        let digest = tokio::task::spawn_blocking(move || bcrypt::hash(secret.as_bytes(), cost))
            .await
            .map_err(join_error)?
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(digest))
    }

    async fn verify(
        &self,
        candidate: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let secret = Zeroizing::new(candidate.to_owned());
        let digest = hash.as_str().to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(secret.as_bytes(), &digest))
            .await
            .map_err(join_error)?;
        match outcome {
            Ok(matches) => Ok(matches),
            Err(err) => {
                // An unreadable stored digest can never match.
                warn!(error = %err, "stored password hash rejected by bcrypt");
                Ok(false)
            }
        }
    }
}
