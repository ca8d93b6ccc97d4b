//! PostgreSQL-backed `RideRepository` implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use pagination::PageRequest;
use tracing::debug;

use crate::domain::ports::{RideRepository, RideRepositoryError};
use crate::domain::{Ride, RideDraft, RideId, RideListRow, RideQuery};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{InvalidRow, RideRow, RideValues};
use super::pool::{DbPool, PoolError};
use super::ride_list_sql::{CountRow, RideListSql, RideListSqlRow};
use super::schema::rides;

/// Diesel-backed implementation of the ride repository port.
#[derive(Clone)]
pub struct DieselRideRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselRideRepository {
    /// Create a repository; `clock` stamps `last_modified_at` on writes.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> RideRepositoryError {
    map_basic_pool_error(error, RideRepositoryError::connection)
}

/// Map Diesel errors, naming the participant behind a foreign key failure.
fn map_diesel_error(error: diesel::result::Error) -> RideRepositoryError {
    match constraint_violation(&error) {
        Some(violation @ ConstraintViolation::ForeignKey(_)) if violation.names("rider_id") => {
            RideRepositoryError::missing_reference("rider")
        }
        Some(violation @ ConstraintViolation::ForeignKey(_)) if violation.names("driver_id") => {
            RideRepositoryError::missing_reference("driver")
        }
        _ => map_basic_diesel_error(
            error,
            RideRepositoryError::query,
            RideRepositoryError::connection,
        ),
    }
}

fn map_invalid_row(error: InvalidRow) -> RideRepositoryError {
    RideRepositoryError::query(error.to_string())
}

fn to_i64(value: usize) -> Result<i64, RideRepositoryError> {
    i64::try_from(value).map_err(|err| RideRepositoryError::query(err.to_string()))
}

fn ride_values(draft: &RideDraft, now: DateTime<Utc>) -> RideValues<'_> {
    RideValues {
        status: draft.status.as_str(),
        rider_id: draft.rider_id.get(),
        driver_id: draft.driver_id.get(),
        pickup_latitude: draft.pickup.latitude,
        pickup_longitude: draft.pickup.longitude,
        dropoff_latitude: draft.dropoff.latitude,
        dropoff_longitude: draft.dropoff.longitude,
        pickup_time: draft.pickup_time,
        last_modified_at: now,
    }
}

#[async_trait]
impl RideRepository for DieselRideRepository {
    async fn count(&self, query: &RideQuery) -> Result<usize, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: CountRow = RideListSql::count(query)
            .into_query()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        usize::try_from(row.count).map_err(|err| RideRepositoryError::query(err.to_string()))
    }

    async fn execute(
        &self,
        query: &RideQuery,
        page: &PageRequest,
    ) -> Result<Vec<RideListRow>, RideRepositoryError> {
        let statement =
            RideListSql::rows(query, to_i64(page.limit())?, to_i64(page.offset())?)
                .map_err(|err| RideRepositoryError::query(err.to_string()))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RideListSqlRow> = statement
            .into_query()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        debug!(rows = rows.len(), page = page.page(), "ride listing loaded");
        rows.into_iter()
            .map(RideListRow::try_from)
            .collect::<Result<_, _>>()
            .map_err(map_invalid_row)
    }

    async fn create(&self, draft: &RideDraft) -> Result<Ride, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: RideRow = diesel::insert_into(rides::table)
            .values(&ride_values(draft, self.clock.utc()))
            .returning(RideRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ride::try_from(row).map_err(map_invalid_row)
    }

    async fn find_by_id(&self, id: RideId) -> Result<Option<Ride>, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        rides::table
            .find(id.get())
            .select(RideRow::as_select())
            .first::<RideRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Ride::try_from)
            .transpose()
            .map_err(map_invalid_row)
    }

    async fn update(
        &self,
        id: RideId,
        draft: &RideDraft,
    ) -> Result<Option<Ride>, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(rides::table.find(id.get()))
            .set(&ride_values(draft, self.clock.utc()))
            .returning(RideRow::as_returning())
            .get_result::<RideRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Ride::try_from)
            .transpose()
            .map_err(map_invalid_row)
    }

    async fn delete(&self, id: RideId) -> Result<bool, RideRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(rides::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    use crate::domain::fixtures::at;
    use crate::domain::{GeoPoint, RideStatus, UserId};

    #[rstest]
    fn write_values_carry_the_supplied_timestamp() {
        let draft = RideDraft {
            status: RideStatus::Pickup,
            rider_id: UserId::new(2),
            driver_id: UserId::new(3),
            pickup: GeoPoint::new(10.3168, 123.8906),
            dropoff: GeoPoint::new(10.3291, 123.9058),
            pickup_time: at(9, 0),
        };

        let values = ride_values(&draft, at(11, 45));
        assert_eq!(values.last_modified_at, at(11, 45));
        assert_eq!(values.status, "pickup");
        assert_eq!((values.rider_id, values.driver_id), (2, 3));
        assert_eq!(values.pickup_time, at(9, 0));
    }
}
