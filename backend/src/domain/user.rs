//! User profile entity.
//!
//! A profile is created exactly once, when the identity provider reports a
//! new account, and afterwards only mutated through partial updates. The
//! identifier is the identity provider's uid and never changes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest accepted user identifier.
pub const USER_ID_MAX: usize = 128;
/// Longest accepted display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Validation errors for user components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier is blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier has leading or trailing whitespace.
    #[error("user id must not contain surrounding whitespace")]
    PaddedId,
    /// The identifier is longer than [`USER_ID_MAX`].
    #[error("user id must be at most {max} characters")]
    IdTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The email is not of the form `local@domain`.
    #[error("email address is malformed")]
    InvalidEmail,
    /// The display name is longer than [`DISPLAY_NAME_MAX`].
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The role is not one of the known roles.
    #[error("unknown role '{value}'")]
    UnknownRole {
        /// Rejected role name.
        value: String,
    },
    /// The points balance would be negative.
    #[error("points balance must not be negative")]
    NegativePoints,
    /// `updated_at` precedes `created_at`.
    #[error("updated_at must not precede created_at")]
    TimestampsOutOfOrder,
}

/// Identity-provider issued user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::UserId;
    ///
    /// let id = UserId::new("fLxJq0s9vTQ2").expect("valid uid");
    /// assert_eq!(id.as_ref(), "fLxJq0s9vTQ2");
    /// assert!(UserId::new("  ").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::PaddedId);
        }
        if id.chars().count() > USER_ID_MAX {
            return Err(UserValidationError::IdTooLong { max: USER_ID_MAX });
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address; empty when the identity provider supplied none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate an email. The empty string is accepted.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.is_empty() {
            return Ok(Self(email));
        }
        let mut parts = email.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(UserValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }

    /// Whether no address is on record.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Portion before the `@`, or empty.
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Name shown to other users; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate a display name. Surrounding whitespace is trimmed.
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into().trim().to_owned();
        if name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(name))
    }

    /// Default display name for a new account: the email's local part,
    /// truncated to [`DISPLAY_NAME_MAX`], or empty.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{DisplayName, Email};
    ///
    /// let email = Email::new("gavin@polkadot.network").expect("email");
    /// assert_eq!(DisplayName::derive_from_email(&email).as_ref(), "gavin");
    /// assert_eq!(DisplayName::derive_from_email(&Email::default()).as_ref(), "");
    /// ```
    pub fn derive_from_email(email: &Email) -> Self {
        Self(email.local_part().chars().take(DISPLAY_NAME_MAX).collect())
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Authorisation role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular account.
    #[default]
    User,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    /// Wire and storage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Input for creating a profile; timestamps are assigned by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Identity-provider uid.
    pub id: UserId,
    /// Address on record, possibly empty.
    pub email: Email,
    /// Name shown to other users.
    pub display_name: DisplayName,
    /// Authorisation role.
    pub role: UserRole,
    /// Starting points balance.
    pub points_balance: u64,
}

impl NewUser {
    /// New profile with the default role and a zero balance.
    pub fn with_defaults(id: UserId, email: Email, display_name: DisplayName) -> Self {
        Self {
            id,
            email,
            display_name,
            role: UserRole::default(),
            points_balance: 0,
        }
    }

    /// Materialise the profile at `now`; `created_at == updated_at`.
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            role: self.role,
            points_balance: self.points_balance,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial profile update. `id` and `created_at` are not updatable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    /// Replacement email.
    pub email: Option<Email>,
    /// Replacement display name.
    pub display_name: Option<DisplayName>,
    /// Replacement role.
    pub role: Option<UserRole>,
    /// Replacement points balance.
    pub points_balance: Option<u64>,
}

/// Persisted user profile.
///
/// ## Invariants
/// - `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: Email,
    display_name: DisplayName,
    role: UserRole,
    points_balance: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Component bundle for [`User::try_from_parts`].
#[derive(Debug, Clone)]
pub struct UserParts {
    /// Identity-provider uid.
    pub id: UserId,
    /// Stored email.
    pub email: Email,
    /// Stored display name.
    pub display_name: DisplayName,
    /// Stored role.
    pub role: UserRole,
    /// Stored points balance.
    pub points_balance: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Rebuild a profile read from storage, checking timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError::TimestampsOutOfOrder`] when
    /// `updated_at < created_at`.
    pub fn try_from_parts(parts: UserParts) -> Result<Self, UserValidationError> {
        if parts.updated_at < parts.created_at {
            return Err(UserValidationError::TimestampsOutOfOrder);
        }
        Ok(Self {
            id: parts.id,
            email: parts.email,
            display_name: parts.display_name,
            role: parts.role,
            points_balance: parts.points_balance,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
        })
    }

    /// Merge `update` into the profile and stamp `updated_at`.
    ///
    /// `now` earlier than `created_at` (clock skew) is clamped so the
    /// timestamp invariant holds.
    pub fn apply(&mut self, update: UserUpdate, now: DateTime<Utc>) {
        let UserUpdate {
            email,
            display_name,
            role,
            points_balance,
        } = update;
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(display_name) = display_name {
            self.display_name = display_name;
        }
        if let Some(role) = role {
            self.role = role;
        }
        if let Some(points_balance) = points_balance {
            self.points_balance = points_balance;
        }
        self.updated_at = now.max(self.created_at);
    }

    /// Identity-provider uid.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Email on record, possibly empty.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Name shown to other users.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Authorisation role.
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Current points balance.
    pub fn points_balance(&self) -> u64 {
        self.points_balance
    }

    /// When the profile was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the profile last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Public projection of a profile returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    /// Identity-provider uid.
    #[schema(example = "fLxJq0s9vTQ2")]
    pub id: String,
    /// Name shown to other users.
    #[schema(example = "gavin")]
    pub display_name: String,
    /// Authorisation role.
    pub role: UserRole,
    /// Current points balance.
    pub points_balance: u64,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            display_name: user.display_name.as_ref().to_owned(),
            role: user.role,
            points_balance: user.points_balance,
            created_at: user.created_at,
        }
    }
}
