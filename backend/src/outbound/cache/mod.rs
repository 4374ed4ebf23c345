//! Delegation statistics cache adapters.
//!
//! - [`RedisDelegationStatsCache`]: shared cache for multi-node deployments,
//!   JSON values written with `SET … EX` and a jittered TTL.
//! - [`InMemoryDelegationStatsCache`]: process-local cache for single-node
//!   runs and tests.

mod memory;
mod redis;
mod ttl;

pub use memory::InMemoryDelegationStatsCache;
pub use redis::{RedisDelegationStatsCache, RedisPoolError, build_redis_pool};
pub use ttl::CacheTtl;
