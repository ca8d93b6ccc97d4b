//! User data model.
//!
//! Users are never hard deleted: deactivation flips `is_active`, which keeps
//! rides that reference the user intact.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Maximum length of usernames and personal names.
pub const NAME_MAX: usize = 64;
/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 254;

/// Validation errors raised by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong { max: usize },
    InvalidEmail,
    NameTooLong { field: &'static str, max: usize },
    InvalidPhoneNumber,
    UnknownRole,
    EmptyPassword,
}

impl UserValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername | Self::UsernameTooLong { .. } => "username",
            Self::InvalidEmail => "email",
            Self::NameTooLong { field, .. } => field,
            Self::InvalidPhoneNumber => "phone_number",
            Self::UnknownRole => "role",
            Self::EmptyPassword => "password",
        }
    }

    /// Machine-readable validation code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyUsername | Self::EmptyPassword => "blank",
            Self::UsernameTooLong { .. } | Self::NameTooLong { .. } => "max_length",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidPhoneNumber => "invalid_phone_number",
            Self::UnknownRole => "invalid_choice",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be blank"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::InvalidEmail => write!(f, "email must be a valid email address"),
            Self::NameTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::InvalidPhoneNumber => write!(
                f,
                "phone_number must be an international number such as +14155550123"
            ),
            Self::UnknownRole => write!(f, "role must be in {}", Role::allowed_values()),
            Self::EmptyPassword => write!(f, "password must not be blank"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Database identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access level of a user. Only admins may use the management API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Regular,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 2] = [Role::Admin, Role::Regular];

    /// Stored and serialised value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Regular => "regular",
        }
    }

    /// Valid values rendered as `['admin', 'regular']` for error messages.
    pub fn allowed_values() -> String {
        quoted_list(Self::ALL.iter().map(|role| role.as_str()))
    }
}

impl std::str::FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or(UserValidationError::UnknownRole)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render `['a', 'b']` style value lists.
pub(crate) fn quoted_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = values.map(|value| format!("'{value}'")).collect();
    format!("[{}]", quoted.join(", "))
}

macro_rules! text_newtype {
    ($name:ident) => {
        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

pub(crate) use text_newtype;

/// Unique login name.
///
/// ## Invariants
/// - Non-empty once trimmed.
/// - At most [`NAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if value.chars().count() > NAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: NAME_MAX });
        }
        Ok(Self(value))
    }

    /// Wrap a stored username without re-validating it.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }
}

text_newtype!(Username);

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address, unique across users regardless of case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.chars().count() > EMAIL_MAX || !email_regex().is_match(&value) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value))
    }

    /// Wrap a stored address without re-validating it.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }
}

text_newtype!(EmailAddress);

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+[1-9][0-9]{6,14}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Optional international phone number; blank when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate and construct a phone number. Blank input is accepted.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.is_empty() || phone_regex().is_match(&value) {
            Ok(Self(value))
        } else {
            Err(UserValidationError::InvalidPhoneNumber)
        }
    }

    /// Wrap a stored number without re-validating it.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }
}

text_newtype!(PhoneNumber);

/// First or last name; may be blank.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name for `field`.
    pub fn new(field: &'static str, value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                field,
                max: NAME_MAX,
            });
        }
        Ok(Self(value))
    }

    /// Wrap a stored name without re-validating it.
    pub(crate) fn from_stored(value: String) -> Self {
        Self(value)
    }
}

text_newtype!(PersonName);

/// Plain-text password accepted from a caller. Never stored or logged, and
/// wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Reject blank passwords.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(value)))
    }

    /// Expose the secret to a hasher.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Stored user account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub phone_number: PhoneNumber,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl User {
    /// Whether the user may call the management API.
    pub fn is_admin(&self) -> bool {
        self.is_active && self.role == Role::Admin
    }
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub username: Username,
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub phone_number: PhoneNumber,
    pub role: Role,
    pub is_active: bool,
    pub password: Password,
}

/// Validated changes to an existing user. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub phone_number: Option<PhoneNumber>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub password: Option<Password>,
}

impl UserPatch {
    /// Swap the plain-text password for its hash.
    pub fn into_changes(self, password_hash: Option<PasswordHash>) -> UserChanges {
        UserChanges {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
            role: self.role,
            is_active: self.is_active,
            password_hash,
        }
    }
}

/// Stored password digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a digest produced by a hasher or read from storage.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Digest text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

/// Insert payload handed to a user repository.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: Username,
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub phone_number: PhoneNumber,
    pub role: Role,
    pub is_active: bool,
    pub password_hash: PasswordHash,
}

impl NewUser {
    /// Pair a validated draft with its hashed password.
    pub fn from_draft(draft: UserDraft, password_hash: PasswordHash) -> Self {
        Self {
            username: draft.username,
            email: draft.email,
            first_name: draft.first_name,
            last_name: draft.last_name,
            phone_number: draft.phone_number,
            role: draft.role,
            is_active: draft.is_active,
            password_hash,
        }
    }
}

/// Column changes handed to a user repository. `None` leaves a column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub email: Option<EmailAddress>,
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub phone_number: Option<PhoneNumber>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub password_hash: Option<PasswordHash>,
}

impl UserChanges {
    /// Changes that only flip the active flag.
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }
}

/// User together with the stored password hash, for login checks.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

#[cfg(test)]
mod tests;
