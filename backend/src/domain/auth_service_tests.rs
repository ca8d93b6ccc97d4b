//! Tests for the authentication service.

use std::sync::Arc;

use rstest::rstest;

use super::*;
use crate::domain::fixtures;
use crate::domain::ports::{MockAuthTokenRepository, MockPasswordHasher, MockUserRepository};
use crate::domain::{
    EmailAddress, ErrorCode, Password, PasswordHash, PersonName, PhoneNumber, UserCredentials,
    Username,
};

type Service = AuthenticationService<MockUserRepository, MockAuthTokenRepository, MockPasswordHasher>;

const KNOWN_TOKEN: &str = "0123456789abcdef0123456789abcdef01234567";

fn known_token() -> AuthToken {
    AuthToken::parse(KNOWN_TOKEN).expect("well formed")
}

fn service(
    users: MockUserRepository,
    tokens: MockAuthTokenRepository,
    hasher: MockPasswordHasher,
) -> Service {
    AuthenticationService::new(Arc::new(users), Arc::new(tokens), Arc::new(hasher))
}

fn stored(active: bool) -> UserCredentials {
    let mut user = fixtures::user(1, "admin", Role::Admin);
    user.is_active = active;
    UserCredentials {
        user,
        password_hash: PasswordHash::new("digest"),
    }
}

fn verifying(expected: &'static str) -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .returning(move |candidate, _| Ok(candidate == expected));
    hasher
}

fn credentials(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("admin", password).expect("valid")
}

#[rstest]
#[tokio::test]
async fn login_returns_the_issued_token() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .withf(|username| username == "admin")
        .returning(|_| Ok(Some(stored(true))));
    let mut tokens = MockAuthTokenRepository::new();
    tokens
        .expect_issue()
        .times(1)
        .returning(|_, _| Ok(known_token()));

    let token = service(users, tokens, verifying("password"))
        .login(&credentials("password"))
        .await
        .expect("login succeeds");
    assert_eq!(token.as_str(), KNOWN_TOKEN);
}

#[rstest]
#[case(Some(true), "wrong")]
#[case(Some(false), "password")]
#[case(None, "password")]
#[tokio::test]
async fn login_failures_share_one_message(#[case] account: Option<bool>, #[case] password: &str) {
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .returning(move |_| Ok(account.map(stored)));
    let mut tokens = MockAuthTokenRepository::new();
    tokens.expect_issue().never();

    let err = service(users, tokens, verifying("password"))
        .login(&credentials(password))
        .await
        .expect_err("login fails");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "Invalid credentials");
}

#[rstest]
#[case(true, LogoutOutcome::LoggedOut)]
#[case(false, LogoutOutcome::Anonymous)]
#[tokio::test]
async fn logout_reports_whether_a_token_was_revoked(
    #[case] revoked: bool,
    #[case] expected: LogoutOutcome,
) {
    let mut tokens = MockAuthTokenRepository::new();
    tokens.expect_revoke().returning(move |_| Ok(revoked));

    let outcome = service(MockUserRepository::new(), tokens, MockPasswordHasher::new())
        .logout(Some(known_token()))
        .await
        .expect("logout never fails on unknown tokens");
    assert_eq!(outcome, expected);
}

#[rstest]
#[tokio::test]
async fn anonymous_logout_touches_nothing() {
    let mut tokens = MockAuthTokenRepository::new();
    tokens.expect_revoke().never();

    let outcome = service(MockUserRepository::new(), tokens, MockPasswordHasher::new())
        .logout(None)
        .await
        .expect("anonymous logout");
    assert_eq!(outcome.message(), "Goodbye");
}

#[rstest]
#[case(None, "Invalid token.")]
#[case(Some(false), "User inactive or deleted.")]
#[tokio::test]
async fn authenticate_rejects_unknown_and_inactive(
    #[case] owner: Option<bool>,
    #[case] message: &str,
) {
    let mut tokens = MockAuthTokenRepository::new();
    tokens
        .expect_find_user()
        .returning(move |_| Ok(owner.map(|active| stored(active).user)));

    let err = service(MockUserRepository::new(), tokens, MockPasswordHasher::new())
        .authenticate(&known_token())
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), message);
}

#[rstest]
#[tokio::test]
async fn sign_up_always_creates_an_active_regular_user() {
    let mut users = MockUserRepository::new();
    users
        .expect_create()
        .withf(|user| user.role == Role::Regular && user.is_active)
        .times(1)
        .returning(|_| Ok(fixtures::user(5, "newcomer", Role::Regular)));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::new("digest")));

    let draft = UserDraft {
        username: Username::new("newcomer").expect("valid"),
        email: EmailAddress::new("newcomer@example.com").expect("valid"),
        first_name: PersonName::default(),
        last_name: PersonName::default(),
        phone_number: PhoneNumber::default(),
        role: Role::Admin,
        is_active: false,
        password: Password::new("s3cret").expect("valid"),
    };
    let user = service(users, MockAuthTokenRepository::new(), hasher)
        .sign_up(draft)
        .await
        .expect("signed up");
    assert_eq!(user.role, Role::Regular);
}
