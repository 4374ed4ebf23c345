//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set through `POLKASSEMBLY_*` environment variables,
//! a configuration file, or command-line flags. Absent values fall back to
//! the accessors' defaults, so a bare process starts with in-memory
//! adapters on the Polkadot network. An unrecognised network name is
//! logged and also falls back to Polkadot.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::Network;
use crate::outbound::cache::CacheTtl;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_INDEXER_URL: &str = "https://{network}.subsquid.io/graphql";

/// Process-wide settings for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "POLKASSEMBLY")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_address: Option<String>,
    /// PostgreSQL URL; unset keeps users and posts in memory.
    pub database_url: Option<String>,
    /// Redis URL; unset keeps the stats cache and refresh ledger in memory.
    pub redis_url: Option<String>,
    /// Network served when a request carries no `x-network` header.
    pub default_network: Option<String>,
    /// Serve delegation statistics from the indexer.
    #[ortho_config(default = true)]
    pub enable_blockchain: bool,
    /// Lifetime of cached delegation statistics, in seconds.
    pub cache_ttl_secs: Option<u64>,
    /// Upper bound of the random extension added to each cache TTL.
    pub cache_jitter_secs: Option<u64>,
    /// Indexer GraphQL URL; `{network}` is replaced per request.
    pub indexer_url: Option<String>,
    /// Timeout for outbound HTTP calls, in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Search service application id.
    pub search_app_id: Option<String>,
    /// Search service write key.
    pub search_write_key: Option<String>,
}

impl AppSettings {
    /// Socket address to listen on, `0.0.0.0:8080` when unset.
    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }

    /// Configured default network, or Polkadot when unset or unrecognised.
    pub fn default_network(&self) -> Network {
        match self.default_network.as_deref().map(str::trim) {
            None | Some("") => Network::default(),
            Some(name) => name.to_ascii_lowercase().parse().unwrap_or_else(|err| {
                warn!(
                    error = %err,
                    fallback = %Network::default(),
                    "ignoring configured default network"
                );
                Network::default()
            }),
        }
    }

    /// Cache expiry policy; unset parts keep [`CacheTtl::default`].
    pub fn cache_ttl(&self) -> CacheTtl {
        let defaults = CacheTtl::default();
        CacheTtl::new(
            self.cache_ttl_secs.map_or(defaults.base(), Duration::from_secs),
            self.cache_jitter_secs.map_or(defaults.jitter(), Duration::from_secs),
        )
    }

    /// Indexer URL template.
    pub fn indexer_url(&self) -> &str {
        self.indexer_url.as_deref().unwrap_or(DEFAULT_INDEXER_URL)
    }

    /// Timeout for outbound HTTP calls, ten seconds when unset.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    /// Write key wrapped so it is wiped once the search client owns a copy.
    pub fn search_write_key(&self) -> Option<Zeroizing<String>> {
        self.search_write_key.clone().map(Zeroizing::new)
    }
}
