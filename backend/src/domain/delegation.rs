//! Conviction-voting delegation aggregates.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Network-wide delegation totals.
///
/// `total_delegated_balance` is a base-unit decimal string; balances exceed
/// the range of JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DelegationStats {
    /// Sum of delegated balances in base units.
    #[schema(example = "1250000000000000")]
    pub total_delegated_balance: String,
    /// Conviction-weighted votes delegated.
    pub total_delegated_votes: u64,
    /// Distinct accounts receiving delegations.
    pub total_delegates: u64,
    /// Distinct accounts delegating.
    pub total_delegators: u64,
}
