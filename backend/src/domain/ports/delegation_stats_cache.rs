//! Port interface for caching computed delegation statistics.
use async_trait::async_trait;

use crate::domain::DelegationStats;

use super::{CacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum DelegationStatsCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "delegation stats cache backend failure: {message}",
        /// Cached content could not be encoded or decoded.
        Serialization { message: String } => "delegation stats cache serialisation failed: {message}",
    }
}

/// Key-value cache with per-entry expiry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DelegationStatsCache: Send + Sync {
    /// Read an unexpired entry.
    async fn get(&self, key: &CacheKey)
    -> Result<Option<DelegationStats>, DelegationStatsCacheError>;

    /// Store an entry; the adapter applies its configured time-to-live.
    async fn put(
        &self,
        key: &CacheKey,
        stats: &DelegationStats,
    ) -> Result<(), DelegationStatsCacheError>;
}
