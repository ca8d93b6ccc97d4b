//! Token authentication extractors.
//!
//! Clients send `Authorization: Token <key>`. Handlers declare what they need
//! by taking [`AdminUser`], [`Authenticated`] or [`PresentedToken`] as an
//! argument; the extractor resolves the token through the
//! [`AuthService`](crate::domain::ports::AuthService) port held in
//! [`HttpState`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{AuthToken, Error, User};

use super::state::HttpState;

/// Keyword preceding the key in the `Authorization` header.
pub const TOKEN_KEYWORD: &str = "Token";

const NOT_PROVIDED: &str = "Authentication credentials were not provided.";
const NOT_PERMITTED: &str = "You do not have permission to perform this action.";

/// What the `Authorization` header carried.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Credentials {
    /// No header, or a scheme other than `Token`.
    Absent,
    Malformed(&'static str),
    Token(AuthToken),
}

fn read_credentials(req: &HttpRequest) -> Credentials {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Credentials::Absent;
    };
    let Ok(value) = header.to_str() else {
        return Credentials::Malformed(
            "Invalid token header. Token string should not contain invalid characters.",
        );
    };
    let mut parts = value.split_whitespace();
    match parts.next() {
        Some(keyword) if keyword.eq_ignore_ascii_case(TOKEN_KEYWORD) => {}
        _ => return Credentials::Absent,
    }
    let (Some(key), None) = (parts.next(), parts.next()) else {
        return Credentials::Malformed(if value.split_whitespace().count() == 1 {
            "Invalid token header. No credentials provided."
        } else {
            "Invalid token header. Token string should not contain spaces."
        });
    };
    AuthToken::parse(key).map_or(Credentials::Malformed("Invalid token."), Credentials::Token)
}

fn http_state(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))
}

async fn authenticate(state: web::Data<HttpState>, credentials: Credentials) -> Result<User, Error> {
    match credentials {
        Credentials::Absent => Err(Error::unauthorized(NOT_PROVIDED)),
        Credentials::Malformed(message) => Err(Error::unauthorized(message)),
        Credentials::Token(token) => state.auth.authenticate(&token).await,
    }
}

/// Any active user holding a valid token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub User);

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = http_state(req);
        let credentials = read_credentials(req);
        Box::pin(async move { authenticate(state?, credentials).await.map(Self) })
    }
}

/// An authenticated user with the `admin` role.
///
/// Missing or invalid credentials yield `401`; a valid non-admin token
/// yields `403`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = http_state(req);
        let credentials = read_credentials(req);
        Box::pin(async move {
            let user = authenticate(state?, credentials).await?;
            if user.is_admin() {
                Ok(Self(user))
            } else {
                debug!(user_id = %user.id, "non-admin caller rejected");
                Err(Error::forbidden(NOT_PERMITTED))
            }
        })
    }
}

/// The well-formed token in the request, if any. Never fails.
#[derive(Debug, Clone, Default)]
pub struct PresentedToken(pub Option<AuthToken>);

impl FromRequest for PresentedToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = match read_credentials(req) {
            Credentials::Token(token) => Some(token),
            Credentials::Absent | Credentials::Malformed(_) => None,
        };
        ready(Ok(Self(token)))
    }
}
