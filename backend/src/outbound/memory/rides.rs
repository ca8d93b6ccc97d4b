//! In-memory ride and ride event repositories, including listing evaluation.

use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use pagination::PageRequest;

use super::{InMemoryStore, StoreState, page_of};
use crate::domain::ports::{
    RideEventRepository, RideEventRepositoryError, RideRepository, RideRepositoryError,
};
use crate::domain::{
    EventWindow, Ride, RideDraft, RideEvent, RideEventId, RideEventRecord, RideId, RideListRow,
    RideOrdering, RideQuery,
};

fn ensure_participants(state: &StoreState, draft: &RideDraft) -> Result<(), RideRepositoryError> {
    if state.user(draft.rider_id.get()).is_none() {
        return Err(RideRepositoryError::missing_reference("rider"));
    }
    if state.user(draft.driver_id.get()).is_none() {
        return Err(RideRepositoryError::missing_reference("driver"));
    }
    Ok(())
}

/// Join, filter and annotate every ride matching `query`'s filters.
fn matching_rows(
    state: &StoreState,
    query: &RideQuery,
) -> Result<Vec<RideListRow>, RideRepositoryError> {
    let email = query.rider_email().map(str::to_lowercase);
    let mut rows = Vec::new();
    for ride in state.rides.values() {
        if query.status().is_some_and(|status| status != ride.status) {
            continue;
        }
        let (Some(rider), Some(driver)) = (
            state.user(ride.rider_id.get()),
            state.user(ride.driver_id.get()),
        ) else {
            return Err(RideRepositoryError::query(format!(
                "ride {} references a missing user",
                ride.id
            )));
        };
        if email
            .as_deref()
            .is_some_and(|email| rider.email.as_ref().to_lowercase() != email)
        {
            continue;
        }
        rows.push(RideListRow {
            ride: ride.clone(),
            rider: rider.clone(),
            driver: driver.clone(),
            distance_km: query
                .distance_from()
                .map(|reference| ride.pickup.haversine_km(&reference)),
        });
    }
    Ok(rows)
}

fn compare_rows(ordering: RideOrdering, a: &RideListRow, b: &RideListRow) -> Ordering {
    let primary = match ordering {
        RideOrdering::PickupTime => a.ride.pickup_time.cmp(&b.ride.pickup_time),
        RideOrdering::Distance => a
            .distance_km
            .unwrap_or_default()
            .total_cmp(&b.distance_km.unwrap_or_default()),
    };
    primary.then(a.ride.id.cmp(&b.ride.id))
}

#[async_trait]
impl RideRepository for InMemoryStore {
    async fn count(&self, query: &RideQuery) -> Result<usize, RideRepositoryError> {
        let state = self.state.read().await;
        Ok(matching_rows(&state, query)?.len())
    }

    async fn execute(
        &self,
        query: &RideQuery,
        page: &PageRequest,
    ) -> Result<Vec<RideListRow>, RideRepositoryError> {
        if !query.is_ordering_satisfiable() {
            return Err(RideRepositoryError::query(
                "cannot order by distance without a distance annotation",
            ));
        }
        let state = self.state.read().await;
        let mut rows = matching_rows(&state, query)?;
        rows.sort_by(|a, b| compare_rows(query.ordering(), a, b));
        Ok(page_of(rows.into_iter(), page))
    }

    async fn create(&self, draft: &RideDraft) -> Result<Ride, RideRepositoryError> {
        let now = self.now();
        let mut state = self.state.write().await;
        ensure_participants(&state, draft)?;
        state.last_ride_id += 1;
        let ride = Ride {
            id: RideId::new(state.last_ride_id),
            status: draft.status,
            rider_id: draft.rider_id,
            driver_id: draft.driver_id,
            pickup: draft.pickup,
            dropoff: draft.dropoff,
            pickup_time: draft.pickup_time,
            created_at: now,
            last_modified_at: now,
        };
        state.rides.insert(ride.id.get(), ride.clone());
        Ok(ride)
    }

    async fn find_by_id(&self, id: RideId) -> Result<Option<Ride>, RideRepositoryError> {
        Ok(self.state.read().await.rides.get(&id.get()).cloned())
    }

    async fn update(
        &self,
        id: RideId,
        draft: &RideDraft,
    ) -> Result<Option<Ride>, RideRepositoryError> {
        let now = self.now();
        let mut state = self.state.write().await;
        if !state.rides.contains_key(&id.get()) {
            return Ok(None);
        }
        ensure_participants(&state, draft)?;
        Ok(state.rides.get_mut(&id.get()).map(|ride| {
            ride.status = draft.status;
            ride.rider_id = draft.rider_id;
            ride.driver_id = draft.driver_id;
            ride.pickup = draft.pickup;
            ride.dropoff = draft.dropoff;
            ride.pickup_time = draft.pickup_time;
            ride.last_modified_at = now;
            ride.clone()
        }))
    }

    async fn delete(&self, id: RideId) -> Result<bool, RideRepositoryError> {
        let mut state = self.state.write().await;
        let removed = state.rides.remove(&id.get()).is_some();
        if removed {
            state.events.retain(|_, event| event.ride_id != id);
        }
        Ok(removed)
    }
}

fn ensure_ride(state: &StoreState, ride_id: RideId) -> Result<(), RideEventRepositoryError> {
    if state.rides.contains_key(&ride_id.get()) {
        Ok(())
    } else {
        Err(RideEventRepositoryError::missing_reference("ride"))
    }
}

#[async_trait]
impl RideEventRepository for InMemoryStore {
    async fn events_for_rides(
        &self,
        rides: &[RideId],
        window: EventWindow,
    ) -> Result<Vec<RideEvent>, RideEventRepositoryError> {
        let wanted: HashSet<RideId> = rides.iter().copied().collect();
        let state = self.state.read().await;
        let mut events: Vec<RideEvent> = state
            .events
            .values()
            .filter(|event| wanted.contains(&event.ride_id) && window.contains(event.created_at))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn create(
        &self,
        record: &RideEventRecord,
    ) -> Result<RideEvent, RideEventRepositoryError> {
        let now = self.now();
        let mut state = self.state.write().await;
        ensure_ride(&state, record.ride_id)?;
        state.last_event_id += 1;
        let event = RideEvent {
            id: RideEventId::new(state.last_event_id),
            ride_id: record.ride_id,
            description: record.description.clone(),
            created_at: record.created_at,
            last_modified_at: now,
        };
        state.events.insert(event.id.get(), event.clone());
        Ok(event)
    }

    async fn find_by_id(
        &self,
        id: RideEventId,
    ) -> Result<Option<RideEvent>, RideEventRepositoryError> {
        Ok(self.state.read().await.events.get(&id.get()).cloned())
    }

    async fn update(
        &self,
        id: RideEventId,
        record: &RideEventRecord,
    ) -> Result<Option<RideEvent>, RideEventRepositoryError> {
        let now = self.now();
        let mut state = self.state.write().await;
        if !state.events.contains_key(&id.get()) {
            return Ok(None);
        }
        ensure_ride(&state, record.ride_id)?;
        Ok(state.events.get_mut(&id.get()).map(|event| {
            event.ride_id = record.ride_id;
            event.description = record.description.clone();
            event.created_at = record.created_at;
            event.last_modified_at = now;
            event.clone()
        }))
    }

    async fn delete(&self, id: RideEventId) -> Result<bool, RideEventRepositoryError> {
        Ok(self.state.write().await.events.remove(&id.get()).is_some())
    }

    async fn count(&self) -> Result<usize, RideEventRepositoryError> {
        Ok(self.state.read().await.events.len())
    }

    async fn list(&self, page: &PageRequest) -> Result<Vec<RideEvent>, RideEventRepositoryError> {
        let state = self.state.read().await;
        Ok(page_of(state.events.values().cloned(), page))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::UserRepository;
    use crate::domain::{
        EmailAddress, EventDescription, GeoPoint, NewUser, PasswordHash, PersonName, PhoneNumber,
        RideStatus, Role, UserId, Username,
    };

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 2, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new(Arc::new(DefaultClock));
        for (name, email) in [("rider", "Rider@Example.com"), ("driver", "driver@example.com")] {
            UserRepository::create(
                &store,
                &NewUser {
                    username: Username::new(name).expect("valid"),
                    email: EmailAddress::new(email).expect("valid"),
                    first_name: PersonName::default(),
                    last_name: PersonName::default(),
                    phone_number: PhoneNumber::default(),
                    role: Role::Regular,
                    is_active: true,
                    password_hash: PasswordHash::new("digest"),
                },
            )
            .await
            .expect("user created");
        }
        store
    }

    fn draft(status: RideStatus, pickup: GeoPoint, hour: u32) -> RideDraft {
        RideDraft {
            status,
            rider_id: UserId::new(1),
            driver_id: UserId::new(2),
            pickup,
            dropoff: GeoPoint::default(),
            pickup_time: at(hour),
        }
    }

    #[fixture]
    fn first_page() -> PageRequest {
        PageRequest::new(1, 10).expect("valid page")
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_driver_is_a_missing_reference() {
        let store = seeded().await;
        let mut ride = draft(RideStatus::Init, GeoPoint::default(), 1);
        ride.driver_id = UserId::new(42);
        let err = RideRepository::create(&store, &ride)
            .await
            .expect_err("unknown driver");
        assert_eq!(err, RideRepositoryError::missing_reference("driver"));
    }

    #[rstest]
    #[tokio::test]
    async fn listing_filters_annotates_and_orders(first_page: PageRequest) {
        let store = seeded().await;
        for (status, pickup, hour) in [
            (RideStatus::Pickup, GeoPoint::new(10.3168, 123.8906), 3),
            (RideStatus::Pickup, GeoPoint::new(45.0, 130.0), 1),
            (RideStatus::Dropoff, GeoPoint::new(10.3, 123.9), 2),
        ] {
            RideRepository::create(&store, &draft(status, pickup, hour))
                .await
                .expect("ride created");
        }

        let query = RideQuery::new()
            .with_status(RideStatus::Pickup)
            .with_rider_email("rider@EXAMPLE.com")
            .annotate_distance(GeoPoint::new(10.31445, 123.9781))
            .order_by(RideOrdering::Distance);
        assert_eq!(RideRepository::count(&store, &query).await.expect("count"), 2);
        let rows = store.execute(&query, &first_page).await.expect("rows");
        let ids: Vec<i64> = rows.iter().map(|row| row.ride.id.get()).collect();
        assert_eq!(ids, [1, 2]);
        let nearest = rows[0].distance_km.expect("annotated");
        assert!((nearest - 9.575_855_827_708_244).abs() < 1e-6);
        assert_eq!(rows[0].rider.username.as_ref(), "rider");

        let by_time = store
            .execute(&query.clone().order_by(RideOrdering::PickupTime), &first_page)
            .await
            .expect("rows");
        let ids: Vec<i64> = by_time.iter().map(|row| row.ride.id.get()).collect();
        assert_eq!(ids, [2, 1]);
    }

    #[rstest]
    #[tokio::test]
    async fn distance_order_requires_annotation(first_page: PageRequest) {
        let store = seeded().await;
        let query = RideQuery::new().order_by(RideOrdering::Distance);
        let err = store
            .execute(&query, &first_page)
            .await
            .expect_err("precondition");
        assert!(matches!(err, RideRepositoryError::Query { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn window_query_filters_and_orders_events() {
        let store = seeded().await;
        let ride = RideRepository::create(&store, &draft(RideStatus::Init, GeoPoint::default(), 1))
            .await
            .expect("ride");
        let other = RideRepository::create(&store, &draft(RideStatus::Init, GeoPoint::default(), 1))
            .await
            .expect("ride");
        for (ride_id, hour) in [(ride.id, 9), (ride.id, 3), (other.id, 8), (ride.id, 5)] {
            RideEventRepository::create(
                &store,
                &RideEventRecord {
                    ride_id,
                    description: EventDescription::new("Status changed").expect("valid"),
                    created_at: at(hour),
                },
            )
            .await
            .expect("event");
        }

        let events = store
            .events_for_rides(&[ride.id], EventWindow::since(at(4)))
            .await
            .expect("events");
        let hours: Vec<DateTime<Utc>> = events.iter().map(|event| event.created_at).collect();
        assert_eq!(hours, [at(5), at(9)]);

        let boundary = store
            .events_for_rides(&[ride.id], EventWindow::since(at(9)))
            .await
            .expect("events");
        assert_eq!(boundary.len(), 1);
        let none = store
            .events_for_rides(&[ride.id], EventWindow::since(at(9) + Duration::seconds(1)))
            .await
            .expect("events");
        assert!(none.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_ride_cascades_to_events() {
        let store = seeded().await;
        let ride = RideRepository::create(&store, &draft(RideStatus::Init, GeoPoint::default(), 1))
            .await
            .expect("ride");
        RideEventRepository::create(
            &store,
            &RideEventRecord {
                ride_id: ride.id,
                description: EventDescription::default(),
                created_at: at(1),
            },
        )
        .await
        .expect("event");

        assert!(RideRepository::delete(&store, ride.id).await.expect("delete"));
        assert_eq!(RideEventRepository::count(&store).await.expect("count"), 0);
        let err = RideEventRepository::create(
            &store,
            &RideEventRecord {
                ride_id: ride.id,
                description: EventDescription::default(),
                created_at: at(1),
            },
        )
        .await
        .expect_err("parent gone");
        assert_eq!(err, RideEventRepositoryError::missing_reference("ride"));
    }
}
