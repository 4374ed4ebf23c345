//! Driving port for reading the caller's public profile.
//!
//! Inbound adapters use this port to load a profile without importing
//! persistence details.

use async_trait::async_trait;

use crate::domain::{Error, PublicUser, UserId};

/// Driving port for the caller's own profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the public profile; `NotFound` when no profile exists.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<PublicUser, Error>;
}
