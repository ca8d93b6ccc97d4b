//! Tests for the ride listing and ride management service.

use std::sync::Arc;

use chrono::Duration;
use mockable::MockClock;
use pagination::PageRequest;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::fixtures::{self, at};
use crate::domain::ports::{MockRideEventRepository, MockRideRepository};
use crate::domain::{ErrorCode, RideStatus, Role};

#[fixture]
fn pipeline() -> RideQueryPipeline {
    let mut clock = MockClock::new();
    clock.expect_utc().returning(|| at(12, 0));
    RideQueryPipeline::new(Arc::new(clock))
}

fn row(id: i64) -> RideListRow {
    RideListRow {
        ride: fixtures::ride(id, 1, 2),
        rider: fixtures::user(1, "rider", Role::Regular),
        driver: fixtures::user(2, "driver", Role::Regular),
        distance_km: None,
    }
}

fn first_page() -> PageRequest {
    PageRequest::new(1, 10).expect("valid page")
}

fn service(
    rides: MockRideRepository,
    events: MockRideEventRepository,
    pipeline: RideQueryPipeline,
) -> RideService<MockRideRepository, MockRideEventRepository> {
    RideService::new(Arc::new(rides), Arc::new(events), pipeline)
}

async fn list(
    service: RideService<MockRideRepository, MockRideEventRepository>,
    params: &RideListParams,
    page: &PageRequest,
) -> Result<Paged<ListedRide>, Error> {
    let query = service.plan_listing(params)?;
    service.list_rides(&query, page).await
}

#[rstest]
#[tokio::test]
async fn listing_issues_one_event_query_for_the_page(pipeline: RideQueryPipeline) {
    let mut rides = MockRideRepository::new();
    rides.expect_count().returning(|_| Ok(3));
    rides
        .expect_execute()
        .times(1)
        .returning(|_, _| Ok(vec![row(1), row(2), row(3)]));

    let mut events = MockRideEventRepository::new();
    events
        .expect_events_for_rides()
        .withf(|ids, window| {
            ids == [RideId::new(1), RideId::new(2), RideId::new(3)]
                && window.cutoff() == at(12, 0) - Duration::hours(24)
        })
        .times(1)
        .returning(|_, _| {
            Ok(vec![
                fixtures::event(10, 3, "Status changed to pickup", at(9, 0)),
                fixtures::event(11, 1, "Status changed to pickup", at(9, 30)),
                fixtures::event(12, 3, "Status changed to dropoff", at(10, 0)),
            ])
        });

    let page = list(
        service(rides, events, pipeline),
        &RideListParams::default(),
        &first_page(),
    )
    .await
    .expect("listing succeeds");

    assert_eq!(page.count, 3);
    let ids: Vec<i64> = page.items.iter().map(|item| item.ride.id.get()).collect();
    assert_eq!(ids, [1, 2, 3]);
    let event_ids: Vec<Vec<i64>> = page
        .items
        .iter()
        .map(|item| item.todays_ride_events.iter().map(|e| e.id.get()).collect())
        .collect();
    assert_eq!(event_ids, vec![vec![11], vec![], vec![10, 12]]);
}

#[rstest]
#[tokio::test]
async fn empty_page_skips_the_event_query(pipeline: RideQueryPipeline) {
    let mut rides = MockRideRepository::new();
    rides.expect_count().returning(|_| Ok(0));
    rides.expect_execute().returning(|_, _| Ok(Vec::new()));
    let mut events = MockRideEventRepository::new();
    events.expect_events_for_rides().never();

    let page = list(
        service(rides, events, pipeline),
        &RideListParams::default(),
        &first_page(),
    )
    .await
    .expect("empty listing succeeds");
    assert_eq!(page.count, 0);
    assert!(page.items.is_empty());
}

#[rstest]
#[tokio::test]
async fn invalid_parameters_never_reach_the_store(pipeline: RideQueryPipeline) {
    let mut rides = MockRideRepository::new();
    rides.expect_count().never();
    rides.expect_execute().never();

    let params = RideListParams {
        sort_by: Some("entropy".to_owned()),
        ..RideListParams::default()
    };
    let err = list(
        service(rides, MockRideEventRepository::new(), pipeline),
        &params,
        &first_page(),
    )
    .await
    .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "sort_key must be in ('pickup_time', 'distance')");
}

#[rstest]
#[tokio::test]
async fn built_query_reaches_the_store(pipeline: RideQueryPipeline) {
    let mut rides = MockRideRepository::new();
    rides
        .expect_count()
        .withf(|query| query.status() == Some(RideStatus::Pickup) && query.is_annotated())
        .returning(|_| Ok(0));
    rides.expect_execute().returning(|_, _| Ok(Vec::new()));

    let params = RideListParams {
        status: Some("pickup".to_owned()),
        lat: Some("10.31445".to_owned()),
        lon: Some("123.9781".to_owned()),
        ..RideListParams::default()
    };
    list(
        service(rides, MockRideEventRepository::new(), pipeline),
        &params,
        &first_page(),
    )
    .await
    .expect("listing succeeds");
}

#[rstest]
#[tokio::test]
async fn page_past_the_end_is_invalid(pipeline: RideQueryPipeline) {
    let mut rides = MockRideRepository::new();
    rides.expect_count().returning(|_| Ok(10));
    rides.expect_execute().never();

    let page = PageRequest::new(2, 10).expect("valid page");
    let err = list(
        service(rides, MockRideEventRepository::new(), pipeline),
        &RideListParams::default(),
        &page,
    )
    .await
    .expect_err("out of range");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Invalid page.");
}

#[rstest]
#[tokio::test]
async fn update_rechecks_coordinates(pipeline: RideQueryPipeline) {
    let mut rides = MockRideRepository::new();
    rides
        .expect_find_by_id()
        .returning(|id| Ok(Some(fixtures::ride(id.get(), 1, 2))));
    rides.expect_update().never();

    let patch = RidePatch {
        pickup_longitude: Some(181.0),
        ..RidePatch::default()
    };
    let err = service(rides, MockRideEventRepository::new(), pipeline)
        .update_ride(RideId::new(5), patch)
        .await
        .expect_err("out of range");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "longitude must be between -180 and 180");
}

#[rstest]
#[tokio::test]
async fn unknown_rider_is_a_bad_request(pipeline: RideQueryPipeline) {
    let mut rides = MockRideRepository::new();
    rides
        .expect_create()
        .returning(|_| Err(RideRepositoryError::missing_reference("rider")));

    let ride = fixtures::ride(0, 98, 2);
    let draft = RideDraft {
        status: ride.status,
        rider_id: ride.rider_id,
        driver_id: ride.driver_id,
        pickup: ride.pickup,
        dropoff: ride.dropoff,
        pickup_time: ride.pickup_time,
    };
    let err = service(rides, MockRideEventRepository::new(), pipeline)
        .create_ride(draft)
        .await
        .expect_err("unknown rider");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().and_then(|d| d["field"].as_str()), Some("rider"));
}

#[rstest]
#[tokio::test]
async fn deleting_a_missing_ride_is_not_found(pipeline: RideQueryPipeline) {
    let mut rides = MockRideRepository::new();
    rides.expect_delete().returning(|_| Ok(false));

    let err = service(rides, MockRideEventRepository::new(), pipeline)
        .delete_ride(RideId::new(77))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
