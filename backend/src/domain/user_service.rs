//! User management services.
//!
//! These services implement the user driving ports. Passwords are hashed
//! through the [`PasswordHasher`] port before anything reaches the store.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageRequest;
use serde_json::json;

use crate::domain::ports::{
    PasswordHashError, PasswordHasher, UserPersistenceError, UserRepository, UsersCommand,
    UsersQuery,
};
use crate::domain::{Error, NewUser, Paged, User, UserChanges, UserDraft, UserId, UserPatch};

pub(crate) fn map_user_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            let message = format!("a user with that {field} already exists");
            Error::conflict(message).with_details(json!({ "field": field, "code": "unique" }))
        }
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

/// Hash the draft's password and insert the user.
pub(crate) async fn insert_user<R, H>(
    users: &R,
    hasher: &H,
    draft: UserDraft,
) -> Result<User, Error>
where
    R: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    let password_hash = hasher
        .hash(&draft.password)
        .await
        .map_err(map_hash_error)?;
    users
        .create(&NewUser::from_draft(draft, password_hash))
        .await
        .map_err(map_user_repository_error)
}

/// User service implementing the user query and command ports.
#[derive(Clone)]
pub struct UserService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> UserService<R, H> {
    /// Create a user service over a repository and a password hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<R, H> UsersQuery for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn list_users(&self, page: &PageRequest) -> Result<Paged<User>, Error> {
        let count = self
            .users
            .count()
            .await
            .map_err(map_user_repository_error)?;
        page.ensure_within(count)
            .map_err(|err| Error::not_found(err.to_string()))?;
        let items = self
            .users
            .list(page)
            .await
            .map_err(map_user_repository_error)?;
        Ok(Paged::new(count, items))
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(id))
    }
}

#[async_trait]
impl<R, H> UsersCommand for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher,
{
    async fn create_user(&self, draft: UserDraft) -> Result<User, Error> {
        insert_user(self.users.as_ref(), self.hasher.as_ref(), draft).await
    }

    async fn update_user(&self, id: UserId, mut patch: UserPatch) -> Result<User, Error> {
        let password_hash = match patch.password.take() {
            Some(password) => Some(
                self.hasher
                    .hash(&password)
                    .await
                    .map_err(map_hash_error)?,
            ),
            None => None,
        };
        self.users
            .update(id, &patch.into_changes(password_hash))
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| user_not_found(id))
    }

    async fn deactivate_user(&self, id: UserId) -> Result<(), Error> {
        self.users
            .update(id, &UserChanges::deactivate())
            .await
            .map_err(map_user_repository_error)?
            .map(|_| ())
            .ok_or_else(|| user_not_found(id))
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
