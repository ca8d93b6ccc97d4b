//! Ride event handlers.
//!
//! ```text
//! GET    /ride-events/
//! POST   /ride-events/ {"ride":1,"description":"Status changed to pickup"}
//! GET    /ride-events/{id}/
//! PUT    /ride-events/{id}/
//! PATCH  /ride-events/{id}/ {"created_at":"2024-06-02T08:30:00Z"}
//! DELETE /ride-events/{id}/
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, Utc};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    DescriptionTooLong, Error, EventDescription, RideEvent, RideEventDraft, RideEventId,
    RideEventPatch, RideId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AdminUser;
use crate::inbound::http::pagination::{PageQuery, envelope};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, field_error, parse_optional_rfc3339_timestamp, require,
};

/// Ride event representation, also embedded in ride listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RideEventResponse {
    #[schema(example = 7)]
    pub id: i64,
    /// Id of the ride the event belongs to.
    #[schema(example = 1)]
    pub ride: i64,
    #[schema(example = "Status changed to pickup")]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<RideEvent> for RideEventResponse {
    fn from(event: RideEvent) -> Self {
        Self {
            id: event.id.get(),
            ride: event.ride_id.get(),
            description: event.description.into(),
            created_at: event.created_at,
        }
    }
}

/// Ride event payload. `created_at` defaults to now and may be backdated.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RideEventRequest {
    pub ride: Option<i64>,
    pub description: Option<String>,
    #[schema(example = "2024-06-02T08:30:00Z")]
    pub created_at: Option<String>,
}

const RIDE: FieldName = FieldName::new("ride");
const DESCRIPTION: FieldName = FieldName::new("description");
const CREATED_AT: FieldName = FieldName::new("created_at");

fn description(raw: String) -> Result<EventDescription, Error> {
    EventDescription::new(raw).map_err(|err: DescriptionTooLong| {
        field_error(DESCRIPTION.as_str(), err.to_string(), "max_length")
    })
}

impl RideEventRequest {
    fn into_draft(self) -> Result<RideEventDraft, Error> {
        let ride_id = RideId::new(require(self.ride, RIDE)?);
        let description = description(require(self.description, DESCRIPTION)?)?;
        let created_at = parse_optional_rfc3339_timestamp(self.created_at.as_deref(), CREATED_AT)?;
        Ok(RideEventDraft {
            ride_id,
            description,
            created_at,
        })
    }

    fn into_patch(self, partial: bool) -> Result<RideEventPatch, Error> {
        if !partial {
            require(self.ride, RIDE)?;
            require(self.description.as_ref(), DESCRIPTION)?;
        }
        Ok(RideEventPatch {
            ride_id: self.ride.map(RideId::new),
            description: self.description.map(description).transpose()?,
            created_at: parse_optional_rfc3339_timestamp(self.created_at.as_deref(), CREATED_AT)?,
        })
    }
}

/// List ride events ordered by id.
#[utoipa::path(
    get,
    path = "/ride-events/",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of ride events", body = crate::inbound::http::schemas::RideEventPage),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Invalid page", body = Error)
    ),
    tags = ["ride-events"],
    operation_id = "listRideEvents"
)]
#[get("/ride-events/")]
pub async fn list_ride_events(
    _admin: AdminUser,
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<RideEventResponse>>> {
    let request = query.request()?;
    let paged = state.ride_events.list_ride_events(&request).await?;
    envelope(&req, &request, paged, RideEventResponse::from).map(web::Json)
}

/// Record a ride event.
#[utoipa::path(
    post,
    path = "/ride-events/",
    request_body = RideEventRequest,
    responses(
        (status = 201, description = "Ride event created", body = RideEventResponse),
        (status = 400, description = "Invalid request or unknown ride", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["ride-events"],
    operation_id = "createRideEvent"
)]
#[post("/ride-events/")]
pub async fn create_ride_event(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    payload: web::Json<RideEventRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let event = state.ride_events_command.create_ride_event(draft).await?;
    Ok(HttpResponse::Created().json(RideEventResponse::from(event)))
}

/// Fetch one ride event.
#[utoipa::path(
    get,
    path = "/ride-events/{id}/",
    params(("id" = i64, Path, description = "Ride event id")),
    responses(
        (status = 200, description = "Ride event", body = RideEventResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown ride event", body = Error)
    ),
    tags = ["ride-events"],
    operation_id = "getRideEvent"
)]
#[get("/ride-events/{id}/")]
pub async fn get_ride_event(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<RideEventResponse>> {
    let event = state
        .ride_events
        .get_ride_event(RideEventId::new(id.into_inner()))
        .await?;
    Ok(web::Json(event.into()))
}

async fn apply_update(
    state: &HttpState,
    id: i64,
    payload: RideEventRequest,
    partial: bool,
) -> ApiResult<web::Json<RideEventResponse>> {
    let patch = payload.into_patch(partial)?;
    let event = state
        .ride_events_command
        .update_ride_event(RideEventId::new(id), patch)
        .await?;
    Ok(web::Json(event.into()))
}

/// Replace a ride event.
#[utoipa::path(
    put,
    path = "/ride-events/{id}/",
    params(("id" = i64, Path, description = "Ride event id")),
    request_body = RideEventRequest,
    responses(
        (status = 200, description = "Ride event updated", body = RideEventResponse),
        (status = 400, description = "Invalid request or unknown ride", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown ride event", body = Error)
    ),
    tags = ["ride-events"],
    operation_id = "replaceRideEvent"
)]
#[put("/ride-events/{id}/")]
pub async fn replace_ride_event(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<RideEventRequest>,
) -> ApiResult<web::Json<RideEventResponse>> {
    apply_update(&state, id.into_inner(), payload.into_inner(), false).await
}

/// Change selected ride event fields.
#[utoipa::path(
    patch,
    path = "/ride-events/{id}/",
    params(("id" = i64, Path, description = "Ride event id")),
    request_body = RideEventRequest,
    responses(
        (status = 200, description = "Ride event updated", body = RideEventResponse),
        (status = 400, description = "Invalid request or unknown ride", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown ride event", body = Error)
    ),
    tags = ["ride-events"],
    operation_id = "updateRideEvent"
)]
#[patch("/ride-events/{id}/")]
pub async fn update_ride_event(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<RideEventRequest>,
) -> ApiResult<web::Json<RideEventResponse>> {
    apply_update(&state, id.into_inner(), payload.into_inner(), true).await
}

/// Delete a ride event.
#[utoipa::path(
    delete,
    path = "/ride-events/{id}/",
    params(("id" = i64, Path, description = "Ride event id")),
    responses(
        (status = 204, description = "Ride event deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown ride event", body = Error)
    ),
    tags = ["ride-events"],
    operation_id = "deleteRideEvent"
)]
#[delete("/ride-events/{id}/")]
pub async fn delete_ride_event(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .ride_events_command
        .delete_ride_event(RideEventId::new(id.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
