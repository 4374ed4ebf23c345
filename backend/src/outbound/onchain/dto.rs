//! GraphQL payloads exchanged with the governance indexer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::DelegationStats;

/// Active OpenGov delegations plus the count of votes cast through them.
pub(super) const DELEGATION_STATS_QUERY: &str = "query DelegationStats {
  votingDelegations(where: { endedAtBlock_isNull: true, type_eq: OpenGov }) {
    from
    to
    balance
  }
  convictionDelegatedVotesConnection(orderBy: id_ASC, where: { removedAtBlock_isNull: true }) {
    totalCount
  }
}";

#[derive(Debug, Serialize)]
pub(super) struct GraphQlRequest<'a> {
    pub(super) query: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlResponse {
    pub(super) data: Option<DelegationStatsData>,
    #[serde(default)]
    pub(super) errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GraphQlError {
    pub(super) message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DelegationStatsData {
    pub(super) voting_delegations: Vec<VotingDelegationDto>,
    pub(super) conviction_delegated_votes_connection: ConnectionDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct VotingDelegationDto {
    pub(super) from: String,
    pub(super) to: String,
    pub(super) balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ConnectionDto {
    pub(super) total_count: u64,
}

impl DelegationStatsData {
    /// Aggregate delegation rows. Balances are summed as `u128` planck.
    pub(super) fn into_stats(self) -> Result<DelegationStats, String> {
        let mut total: u128 = 0;
        let mut delegates = HashSet::new();
        let mut delegators = HashSet::new();
        for row in &self.voting_delegations {
            let balance: u128 = row
                .balance
                .parse()
                .map_err(|_| format!("balance '{}' is not an integer", row.balance))?;
            total = total
                .checked_add(balance)
                .ok_or_else(|| "total delegated balance overflowed".to_owned())?;
            delegates.insert(row.to.as_str());
            delegators.insert(row.from.as_str());
        }
        Ok(DelegationStats {
            total_delegated_balance: total.to_string(),
            total_delegated_votes: self.conviction_delegated_votes_connection.total_count,
            total_delegates: delegates.len() as u64,
            total_delegators: delegators.len() as u64,
        })
    }
}
