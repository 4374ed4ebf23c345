//! Driving port for identity-provider lifecycle notifications.

use async_trait::async_trait;

use crate::domain::UserId;

/// Account data reported by the identity provider on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    /// Provider uid; becomes the profile id.
    pub uid: UserId,
    /// Email as the provider reported it, unvalidated.
    pub email: Option<String>,
    /// Display name as the provider reported it.
    pub display_name: Option<String>,
}

/// Reacts to identity-provider lifecycle events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityEvents: Send + Sync {
    /// React to a newly created identity.
    ///
    /// Infallible by contract: profile-write failures are logged and never
    /// reach the identity provider.
    async fn on_identity_created(&self, record: IdentityRecord);
}
