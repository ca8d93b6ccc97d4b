//! Shared Diesel error mapping for the repositories.
//!
//! Repositories decide what a violated constraint means for their port; this
//! module only classifies the failure and logs it.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Integrity constraint reported by PostgreSQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ConstraintViolation {
    /// Unique constraint or unique index, by name.
    Unique(String),
    /// Foreign key constraint, by name.
    ForeignKey(String),
}

impl ConstraintViolation {
    /// Whether the constraint name mentions `column`.
    pub(super) fn names(&self, column: &str) -> bool {
        match self {
            Self::Unique(name) | Self::ForeignKey(name) => name.contains(column),
        }
    }
}

/// Extract a unique or foreign key violation from a Diesel error.
pub(super) fn constraint_violation(error: &DieselError) -> Option<ConstraintViolation> {
    let DieselError::DatabaseError(kind, info) = error else {
        return None;
    };
    let name = info.constraint_name().unwrap_or_default().to_owned();
    match kind {
        DatabaseErrorKind::UniqueViolation => Some(ConstraintViolation::Unique(name)),
        DatabaseErrorKind::ForeignKeyViolation => Some(ConstraintViolation::ForeignKey(name)),
        _ => None,
    }
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Constraint violations that a repository cares about must be matched with
/// [`constraint_violation`] before falling back to this helper.
pub(super) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DeserializationError(_) => query("database row could not be decoded"),
        _ => query("database error"),
    }
}
