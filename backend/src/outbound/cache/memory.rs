//! Process-local [`DelegationStatsCache`] with clock-driven expiry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::RwLock;

use crate::domain::DelegationStats;
use crate::domain::ports::{CacheKey, DelegationStatsCache, DelegationStatsCacheError};

use super::CacheTtl;

#[derive(Debug, Clone)]
struct Entry {
    stats: DelegationStats,
    expires_at: DateTime<Utc>,
}

/// Cache held in memory; entries are dropped lazily on read after expiry.
#[derive(Clone)]
pub struct InMemoryDelegationStatsCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: CacheTtl,
    clock: Arc<dyn Clock>,
}

impl InMemoryDelegationStatsCache {
    /// Empty cache using the system clock.
    pub fn new(ttl: CacheTtl) -> Self {
        Self::with_clock(ttl, Arc::new(DefaultClock))
    }

    /// Empty cache reading expiry against `clock`.
    pub fn with_clock(ttl: CacheTtl, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }
}

#[async_trait]
impl DelegationStatsCache for InMemoryDelegationStatsCache {
    async fn get(
        &self,
        key: &CacheKey,
    ) -> Result<Option<DelegationStats>, DelegationStatsCacheError> {
        let now = self.clock.utc();
        {
            let entries = self.entries.read().await;
            match entries.get(key.as_str()) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.stats.clone())),
                Some(_) => {}
            }
        }
        let mut entries = self.entries.write().await;
        if entries
            .get(key.as_str())
            .is_some_and(|entry| entry.expires_at <= now)
        {
            entries.remove(key.as_str());
        }
        Ok(None)
    }

    async fn put(
        &self,
        key: &CacheKey,
        stats: &DelegationStats,
    ) -> Result<(), DelegationStatsCacheError> {
        let ttl = self.ttl.sample(&mut SmallRng::from_entropy());
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|err| DelegationStatsCacheError::backend(err.to_string()))?;
        let entry = Entry {
            stats: stats.clone(),
            expires_at: self.clock.utc() + ttl,
        };
        self.entries
            .write()
            .await
            .insert(key.as_str().to_owned(), entry);
        Ok(())
    }
}
