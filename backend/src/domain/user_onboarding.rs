//! Identity-creation trigger.
//!
//! Creates the profile for a freshly registered identity. Every failure is
//! logged here and absorbed: the identity provider must never see an error
//! from profile creation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{IdentityEvents, IdentityRecord, UserRepository};
use crate::domain::{DisplayName, Email, NewUser};

/// Profile bootstrapper implementing [`IdentityEvents`].
#[derive(Clone)]
pub struct UserOnboardingService<R: ?Sized> {
    users: Arc<R>,
}

impl<R: ?Sized> UserOnboardingService<R> {
    /// Create the service over `users`.
    pub fn new(users: Arc<R>) -> Self {
        Self { users }
    }
}

/// Build the initial profile for `record`.
///
/// The email defaults to empty, as does one the validator rejects. The
/// display name is the supplied one, else the email's local part, else
/// empty. An unusable supplied name falls back to the derived one.
pub(crate) fn initial_profile(record: IdentityRecord) -> NewUser {
    let IdentityRecord {
        uid,
        email,
        display_name,
    } = record;
    let email = match Email::new(email.unwrap_or_default()) {
        Ok(email) => email,
        Err(err) => {
            warn!(user_id = %uid, error = %err, "supplied email rejected; storing none");
            Email::default()
        }
    };
    let supplied = display_name
        .filter(|name| !name.trim().is_empty())
        .map(DisplayName::new);
    let display_name = match supplied {
        Some(Ok(name)) => name,
        Some(Err(err)) => {
            warn!(user_id = %uid, error = %err, "supplied display name rejected; deriving from email");
            DisplayName::derive_from_email(&email)
        }
        None => DisplayName::derive_from_email(&email),
    };
    NewUser::with_defaults(uid, email, display_name)
}

#[async_trait]
impl<R> IdentityEvents for UserOnboardingService<R>
where
    R: UserRepository + ?Sized,
{
    async fn on_identity_created(&self, record: IdentityRecord) {
        let uid = record.uid.clone();
        let profile = initial_profile(record);
        match self.users.create(profile).await {
            Ok(user) => info!(user_id = %user.id(), "user profile created"),
            Err(err) => error!(user_id = %uid, error = %err, "failed to create user profile"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockUserRepository, RepositoryError};
    use crate::domain::{UserId, UserRole};
    use chrono::Utc;
    use rstest::rstest;

    fn record(email: Option<&str>, display_name: Option<&str>) -> IdentityRecord {
        IdentityRecord {
            uid: UserId::new("uid-1").expect("uid"),
            email: email.map(str::to_owned),
            display_name: display_name.map(str::to_owned),
        }
    }

    #[rstest]
    #[case(Some("gavin@parity.io"), Some("Gavin W"), "gavin@parity.io", "Gavin W")]
    #[case(Some("gavin@parity.io"), None, "gavin@parity.io", "gavin")]
    #[case(Some("gavin@parity.io"), Some("   "), "gavin@parity.io", "gavin")]
    #[case(None, None, "", "")]
    #[case(None, Some("Anon"), "", "Anon")]
    fn initial_profile_applies_defaults(
        #[case] email: Option<&str>,
        #[case] name: Option<&str>,
        #[case] expected_email: &str,
        #[case] expected_name: &str,
    ) {
        let profile = initial_profile(record(email, name));
        assert_eq!(profile.email.as_ref(), expected_email);
        assert_eq!(profile.display_name.as_ref(), expected_name);
        assert_eq!(profile.role, UserRole::User);
        assert_eq!(profile.points_balance, 0);
    }

    #[rstest]
    fn overlong_name_falls_back_to_email_local_part() {
        let long = "n".repeat(200);
        let profile = initial_profile(record(Some("ada@example.com"), Some(&long)));
        assert_eq!(profile.display_name.as_ref(), "ada");
    }

    #[tokio::test]
    async fn creates_exactly_one_profile() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .times(1)
            .withf(|user| user.id.as_ref() == "uid-1" && user.display_name.as_ref() == "ada")
            .returning(|user| Ok(user.into_user(Utc::now())));
        let service = UserOnboardingService::new(Arc::new(repo));
        service
            .on_identity_created(record(Some("ada@example.com"), None))
            .await;
    }

    #[tokio::test]
    async fn repository_failure_is_absorbed() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(RepositoryError::unavailable("store down")));
        let service = UserOnboardingService::new(Arc::new(repo));
        service.on_identity_created(record(None, None)).await;
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("\"a@b\"@example.com")]
    #[case("a b@example.com")]
    #[tokio::test]
    async fn unusable_email_still_creates_one_profile(#[case] email: &'static str) {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .times(1)
            .withf(|user| {
                user.id.as_ref() == "uid-1"
                    && user.email.is_empty()
                    && user.display_name.as_ref() == "Ada"
            })
            .returning(|user| Ok(user.into_user(Utc::now())));
        let service = UserOnboardingService::new(Arc::new(repo));
        service
            .on_identity_created(record(Some(email), Some("Ada")))
            .await;
    }
}
