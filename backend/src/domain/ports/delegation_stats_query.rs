//! Driving port for delegation statistics reads.

use async_trait::async_trait;

use crate::domain::{DelegationStats, Error, Network};

/// Driving port for delegation totals.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DelegationStatsQuery: Send + Sync {
    /// Cached-or-computed totals; `None` when on-chain reads are disabled.
    async fn delegation_stats(&self, network: Network) -> Result<Option<DelegationStats>, Error>;
}
