//! Driving ports for user management.
//!
//! Inbound adapters call these to read and change accounts without knowing
//! how users are stored or how passwords are hashed.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, Paged, User, UserDraft, UserId, UserPatch};

/// Use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// One page of users ordered by id.
    async fn list_users(&self, page: &PageRequest) -> Result<Paged<User>, Error>;

    /// A single user; `not_found` when the id is unknown.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;
}

/// Use-case port for changing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Create a user with a hashed password.
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error>;

    /// Apply a partial update. A password in the patch is re-hashed.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, Error>;

    /// Soft delete: mark the user inactive.
    async fn deactivate_user(&self, id: UserId) -> Result<(), Error>;
}
