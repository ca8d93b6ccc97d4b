//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use pagination::PageRequest;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserChanges, UserCredentials, UserId};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{InvalidRow, NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselUserRepository {
    /// Create a repository; `clock` stamps `last_modified_at` on updates.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

/// Map Diesel errors, turning unique violations into duplicate errors.
fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match constraint_violation(&error) {
        Some(violation @ ConstraintViolation::Unique(_)) if violation.names("username") => {
            UserPersistenceError::duplicate("username")
        }
        Some(violation @ ConstraintViolation::Unique(_)) if violation.names("email") => {
            UserPersistenceError::duplicate("email")
        }
        _ => map_basic_diesel_error(
            error,
            UserPersistenceError::query,
            UserPersistenceError::connection,
        ),
    }
}

fn map_invalid_row(error: InvalidRow) -> UserPersistenceError {
    UserPersistenceError::query(error.to_string())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            first_name: user.first_name.as_ref(),
            last_name: user.last_name.as_ref(),
            phone_number: user.phone_number.as_ref(),
            role: user.role.as_str(),
            is_active: user.is_active,
            password_hash: user.password_hash.as_str(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_user()
            .map_err(map_invalid_row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(UserRow::into_user)
            .transpose()
            .map_err(map_invalid_row)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| {
            row.into_parts()
                .map(|(user, password_hash)| UserCredentials {
                    user,
                    password_hash,
                })
        })
        .transpose()
        .map_err(map_invalid_row)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = UserChangeset {
            username: changes.username.as_ref().map(AsRef::as_ref),
            email: changes.email.as_ref().map(AsRef::as_ref),
            first_name: changes.first_name.as_ref().map(AsRef::as_ref),
            last_name: changes.last_name.as_ref().map(AsRef::as_ref),
            phone_number: changes.phone_number.as_ref().map(AsRef::as_ref),
            role: changes.role.map(|role| role.as_str()),
            is_active: changes.is_active,
            password_hash: changes.password_hash.as_ref().map(|hash| hash.as_str()),
            last_modified_at: self.clock.utc(),
        };

        diesel::update(users::table.find(id.get()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(UserRow::into_user)
            .transpose()
            .map_err(map_invalid_row)
    }

    async fn count(&self) -> Result<usize, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        usize::try_from(count).map_err(|err| UserPersistenceError::query(err.to_string()))
    }

    async fn list(&self, page: &PageRequest) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .limit(page_bound(page.limit())?)
            .offset(page_bound(page.offset())?)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(UserRow::into_user)
            .collect::<Result<_, _>>()
            .map_err(map_invalid_row)
    }
}

fn page_bound(value: usize) -> Result<i64, UserPersistenceError> {
    i64::try_from(value).map_err(|err| UserPersistenceError::query(err.to_string()))
}
