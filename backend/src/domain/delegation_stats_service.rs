//! Cache-aside read path for delegation statistics.
//!
//! A hit is returned unmodified without touching the source. Cache read
//! failures are treated as misses and cache write failures are logged;
//! neither fails the request. Source failures propagate.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{
    CacheKey, DelegationStatsCache, DelegationStatsQuery, DelegationStatsSource,
};
use crate::domain::{DelegationStats, Error, Network};

/// Serves delegation totals from the cache, filling it from the source on a miss.
#[derive(Clone)]
pub struct DelegationStatsService<C: ?Sized, S: ?Sized> {
    cache: Arc<C>,
    source: Arc<S>,
    enabled: bool,
}

impl<C: ?Sized, S: ?Sized> DelegationStatsService<C, S> {
    /// `enabled = false` turns every read into an empty answer.
    pub fn new(cache: Arc<C>, source: Arc<S>, enabled: bool) -> Self {
        Self {
            cache,
            source,
            enabled,
        }
    }
}

impl<C, S> DelegationStatsService<C, S>
where
    C: DelegationStatsCache + ?Sized,
    S: DelegationStatsSource + ?Sized,
{
    async fn cached(&self, key: &CacheKey) -> Option<DelegationStats> {
        match self.cache.get(key).await {
            Ok(hit) => hit,
            Err(err) => {
                warn!(cache_key = %key, error = %err, "delegation stats cache read failed; recomputing");
                None
            }
        }
    }
}

#[async_trait]
impl<C, S> DelegationStatsQuery for DelegationStatsService<C, S>
where
    C: DelegationStatsCache + ?Sized,
    S: DelegationStatsSource + ?Sized,
{
    async fn delegation_stats(&self, network: Network) -> Result<Option<DelegationStats>, Error> {
        if !self.enabled {
            return Ok(None);
        }
        let key = CacheKey::delegation_stats(network);
        if let Some(stats) = self.cached(&key).await {
            debug!(cache_key = %key, "delegation stats cache hit");
            return Ok(Some(stats));
        }

        let stats = self.source.fetch(network).await?;
        if let Err(err) = self.cache.put(&key, &stats).await {
            warn!(cache_key = %key, error = %err, "delegation stats cache write failed");
        }
        Ok(Some(stats))
    }
}
