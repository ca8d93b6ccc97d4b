//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{NewUser, User, UserChanges, UserCredentials, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column already holds the value.
        Duplicate { field: String } => "a user with that {field} already exists",
    }
}

/// Port for reading and writing user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and return the stored row.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier, active or not.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and password hash by exact username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Apply column changes; `None` when the user does not exist.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Number of stored users.
    async fn count(&self) -> Result<usize, UserPersistenceError>;

    /// One page of users ordered by id.
    async fn list(&self, page: &PageRequest) -> Result<Vec<User>, UserPersistenceError>;
}
