//! Sign-up, login and logout handlers.
//!
//! ```text
//! POST   /auth/signup/ {"username":"alice","email":"alice@example.com","password":"s3cret"}
//! POST   /auth/login/  {"username":"alice","password":"s3cret"}
//! DELETE /auth/logout/ (Authorization: Token <key>)
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::PresentedToken;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{UserRequest, UserResponse};
use crate::inbound::http::validation::field_error;

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "password")]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// API token issued on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
}

/// Plain acknowledgement message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "You have successfully logged out.")]
    pub message: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    field_error(err.field(), err.to_string(), "blank")
}

/// Register a regular user. Any `role` or `is_active` in the payload is
/// ignored.
#[utoipa::path(
    post,
    path = "/auth/signup/",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email taken", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/auth/signup/")]
pub async fn sign_up(
    state: web::Data<HttpState>,
    payload: web::Json<UserRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let user = state.auth.sign_up(draft).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Exchange credentials for the user's API token.
#[utoipa::path(
    post,
    path = "/auth/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login/")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let token = state.auth.login(&credentials).await?;
    Ok(web::Json(TokenResponse {
        token: token.as_str().to_owned(),
    }))
}

/// Revoke the presented token. Always succeeds.
#[utoipa::path(
    delete,
    path = "/auth/logout/",
    responses(
        (status = 200, description = "Logged out, or nothing to revoke", body = MessageResponse)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[delete("/auth/logout/")]
pub async fn logout(
    state: web::Data<HttpState>,
    token: PresentedToken,
) -> ApiResult<web::Json<MessageResponse>> {
    let outcome = state.auth.logout(token.0).await?;
    Ok(web::Json(MessageResponse {
        message: outcome.message().to_owned(),
    }))
}
