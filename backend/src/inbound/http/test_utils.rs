//! Test helpers for inbound HTTP components.
//!
//! Builds the full handler state over the in-memory store with a cheap
//! bcrypt cost, and seeds one admin and one regular user holding tokens.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use mockable::{Clock, DefaultClock};

use crate::domain::{
    EmailAddress, LoginCredentials, Password, PersonName, PhoneNumber, Role, User, UserDraft,
    Username,
};
use crate::inbound::http::{configure, state::HttpState};
use crate::middleware::Trace;
use crate::outbound::credentials::BcryptPasswordHasher;
use crate::outbound::memory::InMemoryStore;
use crate::server::{Repositories, build_http_state};

pub(crate) const PASSWORD: &str = "correct horse";

/// Seeded handler state plus ready-made `Authorization` header values.
pub(crate) struct TestApi {
    pub state: web::Data<HttpState>,
    pub admin: User,
    pub admin_auth: String,
    pub regular: User,
    pub regular_auth: String,
}

pub(crate) fn draft(username: &str, role: Role) -> UserDraft {
    UserDraft {
        username: Username::new(username).expect("username"),
        email: EmailAddress::new(format!("{username}@example.com")).expect("email"),
        first_name: PersonName::default(),
        last_name: PersonName::default(),
        phone_number: PhoneNumber::default(),
        role,
        is_active: true,
        password: Password::new(PASSWORD).expect("password"),
    }
}

async fn seed_user(state: &HttpState, username: &str, role: Role) -> (User, String) {
    let user = state
        .users_command
        .create_user(draft(username, role))
        .await
        .expect("seed user");
    let credentials = LoginCredentials::try_from_parts(username, PASSWORD).expect("credentials");
    let token = state.auth.login(&credentials).await.expect("login");
    (user, format!("Token {}", token.as_str()))
}

/// Fresh in-memory state with an admin and a regular user.
pub(crate) async fn test_api() -> TestApi {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = InMemoryStore::new(Arc::clone(&clock));
    let state = build_http_state(
        Repositories::in_memory(store),
        Arc::new(BcryptPasswordHasher::new(4)),
        clock,
    );
    let (admin, admin_auth) = seed_user(&state, "admin", Role::Admin).await;
    let (regular, regular_auth) = seed_user(&state, "rider", Role::Regular).await;
    TestApi {
        state: web::Data::new(state),
        admin,
        admin_auth,
        regular,
        regular_auth,
    }
}

/// Application with every API route registered over `state`.
pub(crate) fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).wrap(Trace).configure(configure)
}
