//! On-chain indexer adapters.

mod dto;
mod http_source;

pub use http_source::{HttpDelegationStatsSource, IndexerEndpoints};
