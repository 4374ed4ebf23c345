//! Driving port guarding protected operations.

use async_trait::async_trait;

use crate::domain::{Error, GateOutcome, PresentedCredentials};

/// Authenticates a request from its cookies, rotating credentials when needed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialGate: Send + Sync {
    /// Validate, or refresh and rotate, the presented credentials.
    ///
    /// Fails with an `unauthorized` error when neither credential is usable.
    async fn authenticate(&self, credentials: PresentedCredentials) -> Result<GateOutcome, Error>;
}
