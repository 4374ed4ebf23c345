//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bb8_redis::{RedisConnectionManager, bb8::Pool};

use backend::domain::Network;
use backend::domain::ports::SearchIndex;
use backend::inbound::http::credentials::CookiePolicy;
use backend::inbound::http::token_config::TokenSettings;
use backend::outbound::cache::CacheTtl;
use backend::outbound::onchain::IndexerEndpoints;
use backend::outbound::persistence::DbPool;

/// Delegation statistics source and cache settings.
#[derive(Debug, Clone)]
pub struct DelegationConfig {
    pub(crate) enabled: bool,
    pub(crate) cache_ttl: CacheTtl,
    pub(crate) endpoints: IndexerEndpoints,
    pub(crate) timeout: Duration,
}

impl DelegationConfig {
    #[must_use]
    pub fn new(
        enabled: bool,
        cache_ttl: CacheTtl,
        endpoints: IndexerEndpoints,
        timeout: Duration,
    ) -> Self {
        Self {
            enabled,
            cache_ttl,
            endpoints,
            timeout,
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
///
/// Stores without a pool fall back to in-process adapters.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) default_network: Network,
    pub(crate) tokens: TokenSettings,
    pub(crate) delegation: DelegationConfig,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) redis_pool: Option<Pool<RedisConnectionManager>>,
    pub(crate) search: Option<Arc<dyn SearchIndex>>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        default_network: Network,
        tokens: TokenSettings,
        delegation: DelegationConfig,
    ) -> Self {
        Self {
            bind_addr,
            default_network,
            tokens,
            delegation,
            db_pool: None,
            redis_pool: None,
            search: None,
        }
    }

    /// Persist users and posts in PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Share the stats cache and refresh ledger through Redis.
    #[must_use]
    pub fn with_redis_pool(mut self, pool: Pool<RedisConnectionManager>) -> Self {
        self.redis_pool = Some(pool);
        self
    }

    /// Index created posts.
    #[must_use]
    pub fn with_search(mut self, search: Option<Arc<dyn SearchIndex>>) -> Self {
        self.search = search;
        self
    }

    /// Cookie attributes derived from the token settings.
    pub(crate) fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy {
            secure: self.tokens.cookie_secure,
            access_max_age: self.tokens.access_ttl,
            refresh_max_age: self.tokens.refresh_ttl,
        }
    }
}
