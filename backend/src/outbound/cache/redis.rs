//! Redis-backed [`DelegationStatsCache`] using a bb8 connection pool.

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::domain::DelegationStats;
use crate::domain::ports::{CacheKey, DelegationStatsCache, DelegationStatsCacheError};

use super::CacheTtl;

/// Failure building the Redis pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to build redis pool: {message}")]
pub struct RedisPoolError {
    message: String,
}

/// Build a bb8 pool for `redis_url`.
///
/// # Errors
///
/// Returns [`RedisPoolError`] when the URL is malformed or the initial
/// connection fails.
pub async fn build_redis_pool(
    redis_url: &str,
) -> Result<Pool<RedisConnectionManager>, RedisPoolError> {
    let manager = RedisConnectionManager::new(redis_url).map_err(|err| RedisPoolError {
        message: err.to_string(),
    })?;
    Pool::builder()
        .build(manager)
        .await
        .map_err(|err| RedisPoolError {
            message: err.to_string(),
        })
}

/// Shared cache of delegation aggregates stored as JSON strings.
#[derive(Clone)]
pub struct RedisDelegationStatsCache {
    pool: Pool<RedisConnectionManager>,
    ttl: CacheTtl,
}

impl RedisDelegationStatsCache {
    /// Cache over `pool`; every write expires per `ttl`.
    pub fn new(pool: Pool<RedisConnectionManager>, ttl: CacheTtl) -> Self {
        Self { pool, ttl }
    }
}

#[async_trait]
impl DelegationStatsCache for RedisDelegationStatsCache {
    async fn get(
        &self,
        key: &CacheKey,
    ) -> Result<Option<DelegationStats>, DelegationStatsCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| DelegationStatsCacheError::backend(err.to_string()))?;
        let payload: Option<String> = conn
            .get(key.as_str())
            .await
            .map_err(|err| DelegationStatsCacheError::backend(err.to_string()))?;

        payload
            .map(|json| {
                serde_json::from_str(&json)
                    .map_err(|err| DelegationStatsCacheError::serialization(err.to_string()))
            })
            .transpose()
    }

    async fn put(
        &self,
        key: &CacheKey,
        stats: &DelegationStats,
    ) -> Result<(), DelegationStatsCacheError> {
        let payload = serde_json::to_string(stats)
            .map_err(|err| DelegationStatsCacheError::serialization(err.to_string()))?;
        let ttl = self.ttl.sample(&mut SmallRng::from_entropy());

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| DelegationStatsCacheError::backend(err.to_string()))?;
        conn.set_ex::<_, _, ()>(key.as_str(), payload, ttl.as_secs().max(1))
            .await
            .map_err(|err| DelegationStatsCacheError::backend(err.to_string()))?;
        debug!(%key, ttl_secs = ttl.as_secs(), "cached delegation stats");
        Ok(())
    }
}
