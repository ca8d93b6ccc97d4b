//! PostgreSQL-backed `AuthTokenRepository` implementation.
//!
//! `auth_tokens.user_id` is unique, so issuing is an insert that yields to an
//! existing row followed by a lookup of whichever key won.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AuthTokenRepository, AuthTokenRepositoryError};
use crate::domain::{AuthToken, User, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewAuthTokenRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{auth_tokens, users};

/// Diesel-backed implementation of the token repository port.
#[derive(Clone)]
pub struct DieselAuthTokenRepository {
    pool: DbPool,
}

impl DieselAuthTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthTokenRepositoryError {
    map_basic_pool_error(error, AuthTokenRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AuthTokenRepositoryError {
    map_basic_diesel_error(
        error,
        AuthTokenRepositoryError::query,
        AuthTokenRepositoryError::connection,
    )
}

#[async_trait]
impl AuthTokenRepository for DieselAuthTokenRepository {
    async fn issue(
        &self,
        user_id: UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, AuthTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAuthTokenRow {
            key: candidate.as_str(),
            user_id: user_id.get(),
        };

        diesel::insert_into(auth_tokens::table)
            .values(&row)
            .on_conflict(auth_tokens::user_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let key: String = auth_tokens::table
            .filter(auth_tokens::user_id.eq(user_id.get()))
            .select(auth_tokens::key)
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        AuthToken::parse(key.trim())
            .map_err(|err| AuthTokenRepositoryError::query(err.to_string()))
    }

    async fn find_user(&self, token: &AuthToken) -> Result<Option<User>, AuthTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        auth_tokens::table
            .inner_join(users::table)
            .filter(auth_tokens::key.eq(token.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(UserRow::into_user)
            .transpose()
            .map_err(|err| AuthTokenRepositoryError::query(err.to_string()))
    }

    async fn revoke(&self, token: &AuthToken) -> Result<bool, AuthTokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(auth_tokens::table.find(token.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
