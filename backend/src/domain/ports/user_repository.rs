//! Port abstraction for user profile persistence.
use async_trait::async_trait;

use crate::domain::{NewUser, User, UserId, UserUpdate};

use super::RepositoryError;

/// Storage-agnostic user profile persistence.
///
/// Profiles are never deleted through this port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a profile; absence is `Ok(None)`, not an error.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Insert a profile with `created_at == updated_at`.
    ///
    /// Fails with [`RepositoryError::Conflict`] when the id is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Merge `update` into an existing profile and refresh `updated_at`.
    ///
    /// Fails with [`RepositoryError::NotFound`] without side effects when
    /// the profile does not exist.
    async fn update(&self, id: &UserId, update: UserUpdate) -> Result<(), RepositoryError>;
}
