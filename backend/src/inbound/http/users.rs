//! User management handlers.
//!
//! ```text
//! GET    /users/?page=2
//! POST   /users/ {"username":"alice","email":"alice@example.com","password":"s3cret"}
//! GET    /users/{id}/
//! PUT    /users/{id}/
//! PATCH  /users/{id}/ {"phone_number":"+639171234567"}
//! DELETE /users/{id}/
//! ```
//!
//! Every endpoint requires an admin token. Passwords are write-only.

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    EmailAddress, Error, Password, PersonName, PhoneNumber, User, UserDraft, UserId, UserPatch,
    Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AdminUser;
use crate::inbound::http::pagination::{PageQuery, envelope};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_role, require, user_validation_error};

/// User representation returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "alice")]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "+639171234567")]
    pub phone_number: String,
    #[schema(example = "regular")]
    pub role: String,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            username: user.username.into(),
            first_name: user.first_name.into(),
            last_name: user.last_name.into(),
            email: user.email.into(),
            phone_number: user.phone_number.into(),
            role: user.role.as_str().to_owned(),
            is_active: user.is_active,
        }
    }
}

/// User payload for create, sign-up and updates.
///
/// Creation requires `username`, `email` and `password`. `role` defaults to
/// `regular` and `is_active` to `true`. On update a blank password keeps the
/// current one.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Write-only.
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    #[schema(example = "regular")]
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

fn username(raw: String) -> Result<Username, Error> {
    Username::new(raw).map_err(user_validation_error)
}

fn email(raw: String) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(user_validation_error)
}

fn name(field: &'static str, raw: Option<String>) -> Result<Option<PersonName>, Error> {
    raw.map(|value| PersonName::new(field, value).map_err(user_validation_error))
        .transpose()
}

fn phone_number(raw: Option<String>) -> Result<Option<PhoneNumber>, Error> {
    raw.map(|value| PhoneNumber::new(value).map_err(user_validation_error))
        .transpose()
}

impl UserRequest {
    /// Validate a creation payload.
    pub(crate) fn into_draft(self) -> Result<UserDraft, Error> {
        let username = username(require(self.username, USERNAME)?)?;
        let email = email(require(self.email, EMAIL)?)?;
        let password =
            Password::new(require(self.password, PASSWORD)?).map_err(user_validation_error)?;
        Ok(UserDraft {
            username,
            email,
            first_name: name("first_name", self.first_name)?.unwrap_or_default(),
            last_name: name("last_name", self.last_name)?.unwrap_or_default(),
            phone_number: phone_number(self.phone_number)?.unwrap_or_default(),
            role: self.role.as_deref().map(parse_role).transpose()?.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            password,
        })
    }

    /// Validate an update payload. A full update must name `username`,
    /// `email` and `password`; fields left out are not changed either way.
    fn into_patch(self, partial: bool) -> Result<UserPatch, Error> {
        if !partial {
            require(self.username.as_ref(), USERNAME)?;
            require(self.email.as_ref(), EMAIL)?;
            require(self.password.as_ref(), PASSWORD)?;
        }
        let password = self
            .password
            .filter(|value| !value.is_empty())
            .map(Password::new)
            .transpose()
            .map_err(user_validation_error)?;
        Ok(UserPatch {
            username: self.username.map(username).transpose()?,
            email: self.email.map(email).transpose()?,
            first_name: name("first_name", self.first_name)?,
            last_name: name("last_name", self.last_name)?,
            phone_number: phone_number(self.phone_number)?,
            role: self.role.as_deref().map(parse_role).transpose()?,
            is_active: self.is_active,
            password,
        })
    }
}

/// List users ordered by id.
#[utoipa::path(
    get,
    path = "/users/",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of users", body = crate::inbound::http::schemas::UserPage),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Invalid page", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users/")]
pub async fn list_users(
    _admin: AdminUser,
    req: HttpRequest,
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<UserResponse>>> {
    let request = query.request()?;
    let paged = state.users.list_users(&request).await?;
    envelope(&req, &request, paged, UserResponse::from).map(web::Json)
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/users/",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users/")]
pub async fn create_user(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let user = state.users_command.create_user(draft).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/users/{id}/",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}/")]
pub async fn get_user(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.users.get_user(UserId::new(id.into_inner())).await?;
    Ok(web::Json(user.into()))
}

async fn apply_update(
    state: &HttpState,
    id: i64,
    payload: UserRequest,
    partial: bool,
) -> ApiResult<web::Json<UserResponse>> {
    let patch = payload.into_patch(partial)?;
    let user = state
        .users_command
        .update_user(UserId::new(id), patch)
        .await?;
    Ok(web::Json(user.into()))
}

/// Replace a user's fields.
#[utoipa::path(
    put,
    path = "/users/{id}/",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "replaceUser"
)]
#[put("/users/{id}/")]
pub async fn replace_user(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<UserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    apply_update(&state, id.into_inner(), payload.into_inner(), false).await
}

/// Change selected user fields.
#[utoipa::path(
    patch,
    path = "/users/{id}/",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}/")]
pub async fn update_user(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
    payload: web::Json<UserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    apply_update(&state, id.into_inner(), payload.into_inner(), true).await
}

/// Deactivate a user. Rides keep referring to deactivated users.
#[utoipa::path(
    delete,
    path = "/users/{id}/",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "User deactivated"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}/")]
pub async fn delete_user(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    id: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .users_command
        .deactivate_user(UserId::new(id.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
