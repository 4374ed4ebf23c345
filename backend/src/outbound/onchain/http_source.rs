//! Reqwest-backed [`DelegationStatsSource`] querying a per-network
//! GraphQL indexer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::{DELEGATION_STATS_QUERY, GraphQlRequest, GraphQlResponse};
use crate::domain::ports::{DelegationStatsSource, DelegationStatsSourceError};
use crate::domain::{DelegationStats, Network};

const NETWORK_PLACEHOLDER: &str = "{network}";

/// Indexer URL template; `{network}` is replaced by the network wire name.
///
/// # Examples
/// ```
/// use backend::domain::Network;
/// use backend::outbound::onchain::IndexerEndpoints;
///
/// let endpoints = IndexerEndpoints::new("https://{network}.indexer.example/graphql");
/// let url = endpoints.endpoint(Network::Kusama).expect("valid url");
/// assert_eq!(url.as_str(), "https://kusama.indexer.example/graphql");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerEndpoints {
    template: String,
}

impl IndexerEndpoints {
    /// Endpoints from a URL template; `{network}` is replaced per request.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Resolve the endpoint for `network`.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] when the expanded template is not a URL.
    pub fn endpoint(&self, network: Network) -> Result<Url, url::ParseError> {
        Url::parse(&self.template.replace(NETWORK_PLACEHOLDER, network.as_str()))
    }
}

/// Delegation aggregate source backed by the governance indexer.
pub struct HttpDelegationStatsSource {
    client: Client,
    endpoints: IndexerEndpoints,
}

impl HttpDelegationStatsSource {
    /// Build the adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoints: IndexerEndpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }
}

#[async_trait]
impl DelegationStatsSource for HttpDelegationStatsSource {
    async fn fetch(&self, network: Network) -> Result<DelegationStats, DelegationStatsSourceError> {
        let endpoint = self.endpoints.endpoint(network).map_err(|err| {
            DelegationStatsSourceError::query(format!("invalid indexer endpoint: {err}"))
        })?;
        debug!(%network, %endpoint, "querying delegation stats");

        let response = self
            .client
            .post(endpoint)
            .json(&GraphQlRequest {
                query: DELEGATION_STATS_QUERY,
            })
            .send()
            .await
            .map_err(|err| DelegationStatsSourceError::unavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| DelegationStatsSourceError::unavailable(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        parse_stats(body.as_ref())
    }
}

fn map_status_error(status: StatusCode) -> DelegationStatsSourceError {
    let message = format!("indexer returned status {}", status.as_u16());
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        DelegationStatsSourceError::unavailable(message)
    } else {
        DelegationStatsSourceError::query(message)
    }
}

fn parse_stats(body: &[u8]) -> Result<DelegationStats, DelegationStatsSourceError> {
    let decoded: GraphQlResponse = serde_json::from_slice(body).map_err(|err| {
        DelegationStatsSourceError::query(format!("invalid indexer payload: {err}"))
    })?;
    if let Some(first) = decoded.errors.first() {
        return Err(DelegationStatsSourceError::query(format!(
            "indexer error: {}",
            first.message
        )));
    }
    decoded
        .data
        .ok_or_else(|| DelegationStatsSourceError::query("indexer payload has no data"))?
        .into_stats()
        .map_err(DelegationStatsSourceError::query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn aggregates_active_delegations() {
        let body = r#"{
            "data": {
                "votingDelegations": [
                    { "from": "A", "to": "D1", "balance": "10000000000" },
                    { "from": "B", "to": "D1", "balance": "5" },
                    { "from": "A", "to": "D2", "balance": "100000000000000000000000000000" }
                ],
                "convictionDelegatedVotesConnection": { "totalCount": 42 }
            }
        }"#;
        let stats = parse_stats(body.as_bytes()).expect("payload decodes");
        assert_eq!(
            stats.total_delegated_balance,
            "100000000000000000010000000005"
        );
        assert_eq!(stats.total_delegated_votes, 42);
        assert_eq!(stats.total_delegates, 2);
        assert_eq!(stats.total_delegators, 2);
    }

    #[test]
    fn empty_result_is_all_zero() {
        let body = r#"{"data":{"votingDelegations":[],"convictionDelegatedVotesConnection":{"totalCount":0}}}"#;
        let stats = parse_stats(body.as_bytes()).expect("payload decodes");
        assert_eq!(stats.total_delegated_balance, "0");
        assert_eq!(stats.total_delegates, 0);
    }

    #[rstest]
    #[case::not_json("<html>")]
    #[case::graphql_error(r#"{"data":null,"errors":[{"message":"boom"}]}"#)]
    #[case::bad_balance(
        r#"{"data":{"votingDelegations":[{"from":"A","to":"B","balance":"1.5"}],"convictionDelegatedVotesConnection":{"totalCount":0}}}"#
    )]
    fn malformed_payloads_are_query_errors(#[case] body: &str) {
        assert!(matches!(
            parse_stats(body.as_bytes()),
            Err(DelegationStatsSourceError::Query { .. })
        ));
    }

    #[rstest]
    #[case(StatusCode::BAD_GATEWAY, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::BAD_REQUEST, false)]
    fn statuses_map_to_availability(#[case] status: StatusCode, #[case] unavailable: bool) {
        let error = map_status_error(status);
        assert_eq!(
            matches!(error, DelegationStatsSourceError::Unavailable { .. }),
            unavailable
        );
    }
}
