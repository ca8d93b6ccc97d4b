//! PostgreSQL-backed `RideEventRepository` implementation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use pagination::PageRequest;

use crate::domain::ports::{RideEventRepository, RideEventRepositoryError};
use crate::domain::{EventWindow, RideEvent, RideEventId, RideEventRecord, RideId};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{RideEventRow, RideEventValues};
use super::pool::{DbPool, PoolError};
use super::schema::ride_events;

/// Diesel-backed implementation of the ride event repository port.
#[derive(Clone)]
pub struct DieselRideEventRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselRideEventRepository {
    /// Create a repository; `clock` stamps `last_modified_at` on writes.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> RideEventRepositoryError {
    map_basic_pool_error(error, RideEventRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RideEventRepositoryError {
    match constraint_violation(&error) {
        Some(violation @ ConstraintViolation::ForeignKey(_)) if violation.names("ride_id") => {
            RideEventRepositoryError::missing_reference("ride")
        }
        _ => map_basic_diesel_error(
            error,
            RideEventRepositoryError::query,
            RideEventRepositoryError::connection,
        ),
    }
}

fn event_values(record: &RideEventRecord, now: DateTime<Utc>) -> RideEventValues<'_> {
    RideEventValues {
        ride_id: record.ride_id.get(),
        description: record.description.as_ref(),
        created_at: record.created_at,
        last_modified_at: now,
    }
}

fn to_i64(value: usize) -> Result<i64, RideEventRepositoryError> {
    i64::try_from(value).map_err(|err| RideEventRepositoryError::query(err.to_string()))
}

#[async_trait]
impl RideEventRepository for DieselRideEventRepository {
    async fn events_for_rides(
        &self,
        rides: &[RideId],
        window: EventWindow,
    ) -> Result<Vec<RideEvent>, RideEventRepositoryError> {
        if rides.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rides.iter().map(|id| id.get()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RideEventRow> = ride_events::table
            .filter(ride_events::ride_id.eq_any(ids))
            .filter(ride_events::created_at.ge(window.cutoff()))
            .order((ride_events::created_at.asc(), ride_events::id.asc()))
            .select(RideEventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(RideEvent::from).collect())
    }

    async fn create(
        &self,
        record: &RideEventRecord,
    ) -> Result<RideEvent, RideEventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: RideEventRow = diesel::insert_into(ride_events::table)
            .values(&event_values(record, self.clock.utc()))
            .returning(RideEventRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn find_by_id(
        &self,
        id: RideEventId,
    ) -> Result<Option<RideEvent>, RideEventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ride_events::table
            .find(id.get())
            .select(RideEventRow::as_select())
            .first::<RideEventRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(RideEvent::from))
    }

    async fn update(
        &self,
        id: RideEventId,
        record: &RideEventRecord,
    ) -> Result<Option<RideEvent>, RideEventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(ride_events::table.find(id.get()))
            .set(&event_values(record, self.clock.utc()))
            .returning(RideEventRow::as_returning())
            .get_result::<RideEventRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(RideEvent::from))
    }

    async fn delete(&self, id: RideEventId) -> Result<bool, RideEventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(ride_events::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn count(&self) -> Result<usize, RideEventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = ride_events::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        usize::try_from(count).map_err(|err| RideEventRepositoryError::query(err.to_string()))
    }

    async fn list(&self, page: &PageRequest) -> Result<Vec<RideEvent>, RideEventRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RideEventRow> = ride_events::table
            .order(ride_events::id.asc())
            .limit(to_i64(page.limit())?)
            .offset(to_i64(page.offset())?)
            .select(RideEventRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(RideEvent::from).collect())
    }
}
