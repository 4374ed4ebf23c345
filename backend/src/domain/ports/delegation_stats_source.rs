//! Port for the authoritative, expensive delegation aggregate.
use async_trait::async_trait;

use crate::domain::{DelegationStats, Error, Network};

use super::define_port_error;

define_port_error! {
    /// Errors raised while computing delegation statistics.
    pub enum DelegationStatsSourceError {
        /// The indexer could not be reached.
        Unavailable { message: String } => "delegation source unavailable: {message}",
        /// The indexer answered with an unusable payload.
        Query { message: String } => "delegation source query failed: {message}",
    }
}

impl From<DelegationStatsSourceError> for Error {
    fn from(value: DelegationStatsSourceError) -> Self {
        match value {
            DelegationStatsSourceError::Unavailable { message } => {
                Self::service_unavailable(message)
            }
            DelegationStatsSourceError::Query { message } => Self::internal(message),
        }
    }
}

/// Computes delegation totals from chain data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DelegationStatsSource: Send + Sync {
    /// Compute current totals for `network`.
    async fn fetch(&self, network: Network) -> Result<DelegationStats, DelegationStatsSourceError>;
}
