//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they stay testable with mocks and in-memory adapters.

use std::sync::Arc;

use crate::domain::Network;
use crate::domain::ports::{
    CredentialGate, DelegationStatsQuery, IdentityEvents, PostsCommand, PostsQuery,
    UserProfileQuery,
};

use super::credentials::CookiePolicy;

/// Port implementations consumed by the handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Authenticates callers and rotates credentials.
    pub gate: Arc<dyn CredentialGate>,
    /// Reads the caller's profile.
    pub profile: Arc<dyn UserProfileQuery>,
    /// Serves delegation totals.
    pub delegation: Arc<dyn DelegationStatsQuery>,
    /// Reads posts.
    pub posts: Arc<dyn PostsQuery>,
    /// Writes posts.
    pub posts_command: Arc<dyn PostsCommand>,
    /// Handles identity-provider events.
    pub identity: Arc<dyn IdentityEvents>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authenticates callers and rotates credentials.
    pub gate: Arc<dyn CredentialGate>,
    /// Reads the caller's profile.
    pub profile: Arc<dyn UserProfileQuery>,
    /// Serves delegation totals.
    pub delegation: Arc<dyn DelegationStatsQuery>,
    /// Reads posts.
    pub posts: Arc<dyn PostsQuery>,
    /// Writes posts.
    pub posts_command: Arc<dyn PostsCommand>,
    /// Handles identity-provider events.
    pub identity: Arc<dyn IdentityEvents>,
    /// Attributes of the credential cookies handed back to callers.
    pub cookies: CookiePolicy,
    /// Network used when a request names none.
    pub default_network: Network,
}

impl HttpState {
    /// Bundle `ports` with the cookie policy and fallback network.
    pub fn new(ports: HttpStatePorts, cookies: CookiePolicy, default_network: Network) -> Self {
        let HttpStatePorts {
            gate,
            profile,
            delegation,
            posts,
            posts_command,
            identity,
        } = ports;
        Self {
            gate,
            profile,
            delegation,
            posts,
            posts_command,
            identity,
            cookies,
            default_network,
        }
    }
}
