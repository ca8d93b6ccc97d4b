//! Shared harness for end-to-end API tests.
//!
//! Builds the full application over the in-memory store with a clock the
//! test controls, and seeds users through the command ports.

use std::sync::{Arc, Mutex};

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use rideshare::domain::{
    EmailAddress, LoginCredentials, Password, PersonName, PhoneNumber, Role, UserDraft, Username,
};
use rideshare::inbound::http::health::HealthState;
use rideshare::inbound::http::state::HttpState;
use rideshare::outbound::credentials::BcryptPasswordHasher;
use rideshare::outbound::memory::InMemoryStore;
use rideshare::server::{Repositories, build_http_state};
use serde_json::Value;

pub const PASSWORD: &str = "correct horse";

/// Clock pinned to an instant the test may move.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_hours(&self, hours: i64) {
        let mut guard = self.0.lock().expect("clock mutex");
        *guard += TimeDelta::hours(hours);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

/// 2024-06-02 12:00 UTC.
pub fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Handler state, health state and the clock shared by store and services.
pub struct Harness {
    pub state: web::Data<HttpState>,
    pub health: web::Data<HealthState>,
    pub clock: Arc<MutableClock>,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Arc::new(MutableClock::new(noon()));
        let shared: Arc<dyn Clock> = clock.clone();
        let store = InMemoryStore::new(Arc::clone(&shared));
        let state = build_http_state(
            Repositories::in_memory(store),
            Arc::new(BcryptPasswordHasher::new(4)),
            shared,
        );
        Self {
            state: web::Data::new(state),
            health: web::Data::new(HealthState::new()),
            clock,
        }
    }

    /// Create a user and return its id with an `Authorization` header value.
    pub async fn seed_user(&self, username: &str, email: &str, role: Role) -> (i64, String) {
        let draft = UserDraft {
            username: Username::new(username).expect("username"),
            email: EmailAddress::new(email).expect("email"),
            first_name: PersonName::default(),
            last_name: PersonName::default(),
            phone_number: PhoneNumber::default(),
            role,
            is_active: true,
            password: Password::new(PASSWORD).expect("password"),
        };
        let user = self
            .state
            .users_command
            .create_user(draft)
            .await
            .expect("seed user");
        let credentials =
            LoginCredentials::try_from_parts(username, PASSWORD).expect("credentials");
        let token = self.state.auth.login(&credentials).await.expect("login");
        (user.id.get(), format!("Token {}", token.as_str()))
    }
}

/// Send `request`, assert the status and decode the JSON body.
pub async fn call_json<S, R>(app: &S, request: R, expected: StatusCode) -> Value
where
    S: Service<R, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = test::call_service(app, request).await;
    assert_eq!(response.status(), expected);
    test::read_body_json(response).await
}
