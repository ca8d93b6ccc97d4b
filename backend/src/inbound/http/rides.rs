//! Ride handlers: the filtered listing and ride management.
//!
//! ```text
//! GET /rides/?status=pickup&email=alice@example.com&lat=10.31445&lon=123.9781&sort_by=distance
//! POST /rides/ {"rider":2,"driver":3,"pickup_time":"2024-06-02T09:00:00Z"}
//! ```
//!
//! The listing embeds rider and driver, the optional `distance` in
//! kilometres and each ride's events from the last 24 hours. The other
//! endpoints use the basic representation with participant ids.

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, ListedRide, Ride, RideDraft, RideId, RideListParams, RidePatch, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AdminUser;
use crate::inbound::http::pagination::{PageQuery, envelope};
use crate::inbound::http::ride_events::RideEventResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;
use crate::inbound::http::validation::{
    FieldName, parse_optional_rfc3339_timestamp, parse_rfc3339_timestamp, parse_status, require,
    validated_point,
};

/// Basic ride representation with participant ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RideResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "init")]
    pub status: String,
    #[schema(example = 2)]
    pub rider: i64,
    #[schema(example = 3)]
    pub driver: i64,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub pickup_time: DateTime<Utc>,
}

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        Self {
            id: ride.id.get(),
            status: ride.status.as_str().to_owned(),
            rider: ride.rider_id.get(),
            driver: ride.driver_id.get(),
            pickup_latitude: ride.pickup.latitude,
            pickup_longitude: ride.pickup.longitude,
            dropoff_latitude: ride.dropoff.latitude,
            dropoff_longitude: ride.dropoff.longitude,
            pickup_time: ride.pickup_time,
        }
    }
}

/// Listing representation with embedded participants and recent events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListedRideResponse {
    pub id: i64,
    pub status: String,
    pub rider: UserResponse,
    pub driver: UserResponse,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
    pub pickup_time: DateTime<Utc>,
    /// Kilometres from `lat`/`lon`; only present when they were given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Events created within the last 24 hours.
    pub todays_ride_events: Vec<RideEventResponse>,
}

impl From<ListedRide> for ListedRideResponse {
    fn from(listed: ListedRide) -> Self {
        let ListedRide {
            ride,
            rider,
            driver,
            distance_km,
            todays_ride_events,
        } = listed;
        Self {
            id: ride.id.get(),
            status: ride.status.as_str().to_owned(),
            rider: rider.into(),
            driver: driver.into(),
            pickup_latitude: ride.pickup.latitude,
            pickup_longitude: ride.pickup.longitude,
            dropoff_latitude: ride.dropoff.latitude,
            dropoff_longitude: ride.dropoff.longitude,
            pickup_time: ride.pickup_time,
            distance: distance_km,
            todays_ride_events: todays_ride_events
                .into_iter()
                .map(RideEventResponse::from)
                .collect(),
        }
    }
}

/// Listing query string. Values stay textual so each stage reports its own
/// validation message.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RideListQuery {
    /// Exact status: `init`, `pickup`, `enroute` or `dropoff`.
    pub status: Option<String>,
    /// Rider email, matched case-insensitively.
    pub email: Option<String>,
    /// Reference latitude for `distance`.
    pub lat: Option<String>,
    /// Reference longitude for `distance`.
    pub lon: Option<String>,
    /// `pickup_time` (default) or `distance`.
    pub sort_by: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl RideListQuery {
    fn split(self) -> (RideListParams, PageQuery) {
        let Self {
            status,
            email,
            lat,
            lon,
            sort_by,
            page,
            page_size,
        } = self;
        (
            RideListParams {
                status,
                email,
                lat,
                lon,
                sort_by,
            },
            PageQuery { page, page_size },
        )
    }
}

/// Ride payload. Coordinates default to 0 and `status` to `init`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RideRequest {
    #[schema(example = "init")]
    pub status: Option<String>,
    pub rider: Option<i64>,
    pub driver: Option<i64>,
    pub pickup_latitude: Option<f64>,
    pub pickup_longitude: Option<f64>,
    pub dropoff_latitude: Option<f64>,
    pub dropoff_longitude: Option<f64>,
    #[schema(example = "2024-06-02T09:00:00Z")]
    pub pickup_time: Option<String>,
}

const RIDER: FieldName = FieldName::new("rider");
const DRIVER: FieldName = FieldName::new("driver");
const PICKUP_TIME: FieldName = FieldName::new("pickup_time");

impl RideRequest {
    fn into_draft(self) -> Result<RideDraft, Error> {
        let rider_id = UserId::new(require(self.rider, RIDER)?);
        let driver_id = UserId::new(require(self.driver, DRIVER)?);
        let pickup_time = parse_rfc3339_timestamp(
            require(self.pickup_time.as_deref(), PICKUP_TIME)?,
            PICKUP_TIME,
        )?;
        Ok(RideDraft {
            status: self
                .status
                .as_deref()
                .map(parse_status)
                .transpose()?
                .unwrap_or_default(),
            rider_id,
            driver_id,
            pickup: validated_point(
                "pickup",
                self.pickup_latitude.unwrap_or_default(),
                self.pickup_longitude.unwrap_or_default(),
            )?,
            dropoff: validated_point(
                "dropoff",
                self.dropoff_latitude.unwrap_or_default(),
                self.dropoff_longitude.unwrap_or_default(),
            )?,
            pickup_time,
        })
    }

    /// A full update must name `rider`, `driver` and `pickup_time`.
    fn into_patch(self, partial: bool) -> Result<RidePatch, Error> {
        if !partial {
            require(self.rider, RIDER)?;
            require(self.driver, DRIVER)?;
            require(self.pickup_time.as_ref(), PICKUP_TIME)?;
        }
        Ok(RidePatch {
            status: self.status.as_deref().map(parse_status).transpose()?,
            rider_id: self.rider.map(UserId::new),
            driver_id: self.driver.map(UserId::new),
            pickup_latitude: self.pickup_latitude,
            pickup_longitude: self.pickup_longitude,
            dropoff_latitude: self.dropoff_latitude,
            dropoff_longitude: self.dropoff_longitude,
            pickup_time: parse_optional_rfc3339_timestamp(
                self.pickup_time.as_deref(),
                PICKUP_TIME,
            )?,
        })
    }
}

/// List rides with filters, optional distance annotation and ordering.
#[utoipa::path(
    get,
    path = "/rides/",
    params(RideListQuery),
    responses(
        (status = 200, description = "One page of rides", body = crate::inbound::http::schemas::RidePage),
        (status = 400, description = "Invalid filter, coordinates or sort key", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Invalid page", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["rides"],
    operation_id = "listRides"
)]
#[get("/rides/")]
pub async fn list_rides(
    _admin: AdminUser,
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<RideListQuery>,
) -> ApiResult<web::Json<Page<ListedRideResponse>>> {
    let (params, page) = query.into_inner().split();
    let planned = state.rides.plan_listing(&params)?;
    let request = page.request()?;
    let paged = state.rides.list_rides(&planned, &request).await?;
    envelope(&req, &request, paged, ListedRideResponse::from).map(web::Json)
}

/// Create a ride.
#[utoipa::path(
    post,
    path = "/rides/",
    request_body = RideRequest,
    responses(
        (status = 201, description = "Ride created", body = RideResponse),
        (status = 400, description = "Invalid request or unknown participant", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["rides"],
    operation_id = "createRide"
)]
#[post("/rides/")]
pub async fn create_ride(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    payload: web::Json<RideRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let ride = state.rides_command.create_ride(draft).await?;
    Ok(HttpResponse::Created().json(RideResponse::from(ride)))
}

/// Fetch one ride.
#[utoipa::path(
    get,
    path = "/rides/{id}/",
    params(("id" = i64, Path, description = "Ride id")),
    responses(
        (status = 200, description = "Ride", body = RideResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown ride", body = Error)
    ),
    tags = ["rides"],
    operation_id = "getRide"
)]
#[get("/rides/{id}/")]
pub async fn get_ride(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<RideResponse>> {
    let ride = state.rides.get_ride(RideId::new(id.into_inner())).await?;
    Ok(web::Json(ride.into()))
}

async fn apply_update(
    state: &HttpState,
    id: i64,
    payload: RideRequest,
    partial: bool,
) -> ApiResult<web::Json<RideResponse>> {
    let patch = payload.into_patch(partial)?;
    let ride = state
        .rides_command
        .update_ride(RideId::new(id), patch)
        .await?;
    Ok(web::Json(ride.into()))
}

/// Replace a ride.
#[utoipa::path(
    put,
    path = "/rides/{id}/",
    params(("id" = i64, Path, description = "Ride id")),
    request_body = RideRequest,
    responses(
        (status = 200, description = "Ride updated", body = RideResponse),
        (status = 400, description = "Invalid request or unknown participant", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown ride", body = Error)
    ),
    tags = ["rides"],
    operation_id = "replaceRide"
)]
#[put("/rides/{id}/")]
pub async fn replace_ride(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<RideRequest>,
) -> ApiResult<web::Json<RideResponse>> {
    apply_update(&state, id.into_inner(), payload.into_inner(), false).await
}

/// Change selected ride fields. Any status may follow any other.
#[utoipa::path(
    patch,
    path = "/rides/{id}/",
    params(("id" = i64, Path, description = "Ride id")),
    request_body = RideRequest,
    responses(
        (status = 200, description = "Ride updated", body = RideResponse),
        (status = 400, description = "Invalid request or unknown participant", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown ride", body = Error)
    ),
    tags = ["rides"],
    operation_id = "updateRide"
)]
#[patch("/rides/{id}/")]
pub async fn update_ride(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<RideRequest>,
) -> ApiResult<web::Json<RideResponse>> {
    apply_update(&state, id.into_inner(), payload.into_inner(), true).await
}

/// Delete a ride and its events.
#[utoipa::path(
    delete,
    path = "/rides/{id}/",
    params(("id" = i64, Path, description = "Ride id")),
    responses(
        (status = 204, description = "Ride deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown ride", body = Error)
    ),
    tags = ["rides"],
    operation_id = "deleteRide"
)]
#[delete("/rides/{id}/")]
pub async fn delete_ride(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .rides_command
        .delete_ride(RideId::new(id.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Handler coverage over the in-memory store.
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as atest;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{test_api, test_app};

    #[rstest]
    fn listing_query_splits_filters_from_paging() {
        let query = RideListQuery {
            status: Some("init".into()),
            sort_by: Some("distance".into()),
            page: Some("2".into()),
            ..RideListQuery::default()
        };
        let (params, page) = query.split();
        assert_eq!(params.status.as_deref(), Some("init"));
        assert_eq!(params.sort_by.as_deref(), Some("distance"));
        assert_eq!(page.page.as_deref(), Some("2"));
        assert_eq!(page.page_size, None);
    }

    #[rstest]
    fn listing_omits_distance_without_reference() {
        let listed = ListedRide {
            ride: crate::domain::fixtures::ride(1, 2, 3),
            rider: crate::domain::fixtures::user(2, "rider", crate::domain::Role::Regular),
            driver: crate::domain::fixtures::user(3, "driver", crate::domain::Role::Regular),
            distance_km: None,
            todays_ride_events: Vec::new(),
        };
        let body = serde_json::to_value(ListedRideResponse::from(listed)).expect("json");
        assert!(body.get("distance").is_none());
        assert_eq!(body.get("todays_ride_events"), Some(&json!([])));
        assert_eq!(body.pointer("/rider/username"), Some(&json!("rider")));
    }

    #[rstest]
    #[case(json!({ "driver": 1, "pickup_time": "2024-06-02T09:00:00Z" }), "rider")]
    #[case(json!({ "rider": 1, "pickup_time": "2024-06-02T09:00:00Z" }), "driver")]
    #[case(json!({ "rider": 1, "driver": 2 }), "pickup_time")]
    #[case(json!({ "rider": 1, "driver": 2, "pickup_time": "9am" }), "pickup_time")]
    #[case(json!({ "rider": 1, "driver": 2, "pickup_time": "2024-06-02T09:00:00Z", "status": "droppoff" }), "status")]
    #[case(json!({ "rider": 1, "driver": 2, "pickup_time": "2024-06-02T09:00:00Z", "pickup_latitude": 91.0 }), "pickup_latitude")]
    #[case(json!({ "rider": 1, "driver": 2, "pickup_time": "2024-06-02T09:00:00Z", "dropoff_longitude": -181.0 }), "dropoff_longitude")]
    #[case(json!({ "rider": 1, "driver": 999, "pickup_time": "2024-06-02T09:00:00Z" }), "driver")]
    #[actix_web::test]
    async fn create_rejects_invalid_payloads(#[case] payload: Value, #[case] field: &str) {
        let api = test_api().await;
        let app = atest::init_service(test_app(api.state.clone())).await;

        let response = atest::call_service(
            &app,
            atest::TestRequest::post()
                .uri("/rides/")
                .insert_header(("Authorization", api.admin_auth.as_str()))
                .set_json(payload)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = atest::read_body_json(response).await;
        assert_eq!(
            body.pointer("/details/field").and_then(Value::as_str),
            Some(field)
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn create_then_patch_status() {
        let api = test_api().await;
        let app = atest::init_service(test_app(api.state.clone())).await;

        let response = atest::call_service(
            &app,
            atest::TestRequest::post()
                .uri("/rides/")
                .insert_header(("Authorization", api.admin_auth.as_str()))
                .set_json(json!({
                    "rider": api.regular.id.get(),
                    "driver": api.admin.id.get(),
                    "pickup_latitude": 10.3168,
                    "pickup_longitude": 123.8906,
                    "pickup_time": "2024-06-02T09:00:00Z"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: Value = atest::read_body_json(response).await;
        assert_eq!(created.get("status"), Some(&json!("init")));
        assert_eq!(created.get("dropoff_latitude"), Some(&json!(0.0)));
        let id = created.get("id").and_then(Value::as_i64).expect("id");

        let patched: Value = atest::call_and_read_body_json(
            &app,
            atest::TestRequest::patch()
                .uri(&format!("/rides/{id}/"))
                .insert_header(("Authorization", api.admin_auth.as_str()))
                .set_json(json!({ "status": "dropoff" }))
                .to_request(),
        )
        .await;
        assert_eq!(patched.get("status"), Some(&json!("dropoff")));
        assert_eq!(patched.get("pickup_latitude"), Some(&json!(10.3168)));
    }

    #[rstest]
    #[case("?sort_by=entropy", "sort_key must be in ('pickup_time', 'distance')")]
    #[case("?lat=10.3", "You must provide values for lat and lon")]
    #[case("?lat=north&lon=east", "lat and lon must both be float type")]
    #[case("?status=INIT", "status must be in ['init', 'pickup', 'enroute', 'dropoff']")]
    #[actix_web::test]
    async fn listing_reports_parameter_errors(#[case] query: &str, #[case] message: &str) {
        let api = test_api().await;
        let app = atest::init_service(test_app(api.state.clone())).await;

        let response = atest::call_service(
            &app,
            atest::TestRequest::get()
                .uri(&format!("/rides/{query}"))
                .insert_header(("Authorization", api.admin_auth.as_str()))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = atest::read_body_json(response).await;
        assert_eq!(body.get("message").and_then(Value::as_str), Some(message));
    }

    #[rstest]
    #[actix_web::test]
    async fn distance_ordering_without_coordinates_is_an_internal_error() {
        let api = test_api().await;
        let app = atest::init_service(test_app(api.state.clone())).await;

        let response = atest::call_service(
            &app,
            atest::TestRequest::get()
                .uri("/rides/?sort_by=distance")
                .insert_header(("Authorization", api.admin_auth.as_str()))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[rstest]
    #[case("?status=bogus&page=abc", "status")]
    #[case("?sort_by=entropy&page=9", "sort_by")]
    #[case("?lat=10.3&page=0", "lat")]
    #[actix_web::test]
    async fn parameter_errors_take_precedence_over_page_errors(
        #[case] query: &str,
        #[case] field: &str,
    ) {
        let api = test_api().await;
        let app = atest::init_service(test_app(api.state.clone())).await;

        let response = atest::call_service(
            &app,
            atest::TestRequest::get()
                .uri(&format!("/rides/{query}"))
                .insert_header(("Authorization", api.admin_auth.as_str()))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = atest::read_body_json(response).await;
        assert_eq!(body.pointer("/details/fields/0"), Some(&json!(field)));
    }

    #[rstest]
    #[case("?page=2")]
    #[case("?page=first")]
    #[actix_web::test]
    async fn listing_pages_past_the_end_are_not_found(#[case] query: &str) {
        let api = test_api().await;
        let app = atest::init_service(test_app(api.state.clone())).await;

        let response = atest::call_service(
            &app,
            atest::TestRequest::get()
                .uri(&format!("/rides/{query}"))
                .insert_header(("Authorization", api.admin_auth.as_str()))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = atest::read_body_json(response).await;
        assert_eq!(body.get("message"), Some(&json!("Invalid page.")));
    }
}
