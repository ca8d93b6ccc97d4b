//! Regression coverage for port error constructors and shared port types.

use rstest::rstest;

use super::*;

#[rstest]
fn duplicate_user_error_names_the_field() {
    let err = UserPersistenceError::duplicate("email");
    assert_eq!(err.to_string(), "a user with that email already exists");
}

#[rstest]
#[case(
    RideRepositoryError::missing_reference("rider"),
    "rider refers to an unknown user"
)]
#[case(
    RideRepositoryError::connection("pool exhausted"),
    "ride repository connection failed: pool exhausted"
)]
fn ride_repository_errors_render(#[case] err: RideRepositoryError, #[case] expected: &str) {
    assert_eq!(err.to_string(), expected);
}

#[rstest]
fn missing_ride_reference_renders() {
    let err = RideEventRepositoryError::missing_reference("ride");
    assert_eq!(err.to_string(), "ride refers to an unknown ride");
}

#[rstest]
#[case(LogoutOutcome::LoggedOut, "You have successfully logged out.")]
#[case(LogoutOutcome::Anonymous, "Goodbye")]
fn logout_messages(#[case] outcome: LogoutOutcome, #[case] expected: &str) {
    assert_eq!(outcome.message(), expected);
}
