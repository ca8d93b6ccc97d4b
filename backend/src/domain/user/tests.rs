//! Tests for the domain user model.

use super::*;
use rstest::rstest;

#[rstest]
#[case("rider")]
#[case("a")]
fn username_accepts_short_names(#[case] raw: &str) {
    assert_eq!(Username::new(raw).expect("valid").as_ref(), raw);
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("   ", UserValidationError::EmptyUsername)]
fn username_rejects_blank(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
fn username_enforces_length() {
    let long = "x".repeat(NAME_MAX + 1);
    let err = Username::new(long).expect_err("too long");
    assert_eq!(err.to_string(), "username must be at most 64 characters");
    assert_eq!(err.field(), "username");
    assert_eq!(err.code(), "max_length");
}

#[rstest]
#[case("rider@example.com", true)]
#[case("Rider@Example.COM", true)]
#[case("no-at-sign", false)]
#[case("two@@example.com", false)]
#[case("missing@tld", false)]
#[case("spaces in@example.com", false)]
fn email_validation(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(EmailAddress::new(raw).is_ok(), ok);
}

#[rstest]
#[case("", true)]
#[case("+639171234567", true)]
#[case("+14155550123", true)]
#[case("09171234567", false)]
#[case("+0123456789", false)]
#[case("+12", false)]
#[case("+1415555012345678", false)]
fn phone_number_validation(#[case] raw: &str, #[case] ok: bool) {
    assert_eq!(PhoneNumber::new(raw).is_ok(), ok);
}

#[rstest]
fn person_name_reports_field() {
    let err = PersonName::new("last_name", "y".repeat(65)).expect_err("too long");
    assert_eq!(err.field(), "last_name");
    assert_eq!(err.to_string(), "last_name must be at most 64 characters");
}

#[rstest]
#[case("admin", Ok(Role::Admin))]
#[case("regular", Ok(Role::Regular))]
#[case("Admin", Err(UserValidationError::UnknownRole))]
#[case("driver", Err(UserValidationError::UnknownRole))]
fn role_parsing_is_exact(#[case] raw: &str, #[case] expected: Result<Role, UserValidationError>) {
    assert_eq!(raw.parse::<Role>(), expected);
}

#[rstest]
fn role_error_lists_allowed_values() {
    assert_eq!(
        UserValidationError::UnknownRole.to_string(),
        "role must be in ['admin', 'regular']"
    );
}

#[rstest]
fn password_is_redacted_in_debug_output() {
    let password = Password::new("hunter2").expect("non-empty");
    assert_eq!(format!("{password:?}"), "Password(***)");
    assert_eq!(password.expose(), "hunter2");
    assert_eq!(Password::new(""), Err(UserValidationError::EmptyPassword));
}

#[rstest]
fn patch_conversion_keeps_fields_and_takes_hash() {
    let patch = UserPatch {
        first_name: Some(PersonName::new("first_name", "Ada").expect("valid")),
        password: Some(Password::new("s3cret").expect("valid")),
        ..UserPatch::default()
    };
    let changes = patch.into_changes(Some(PasswordHash::new("$2b$04$digest")));
    assert_eq!(changes.first_name.map(String::from), Some("Ada".to_owned()));
    assert_eq!(
        changes.password_hash.as_ref().map(PasswordHash::as_str),
        Some("$2b$04$digest")
    );
    assert_eq!(format!("{:?}", PasswordHash::new("x")), "PasswordHash(***)");
}
