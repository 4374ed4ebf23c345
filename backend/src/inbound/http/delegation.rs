//! Delegation statistics endpoint.

use actix_web::{HttpResponse, get, web};
use serde_json::Map;

use crate::domain::{DelegationStats, Error};

use super::ApiResult;
use super::network::RequestNetwork;
use super::state::HttpState;

/// Network-wide delegation totals, served from cache when fresh.
///
/// Responds with an empty object when on-chain reads are disabled.
#[utoipa::path(
    get,
    path = "/api/v2/delegation/stats",
    tags = ["delegation"],
    params(
        ("x-network" = Option<String>, Header, description = "Target network; defaults to the configured network")
    ),
    responses(
        (status = 200, description = "Delegation totals, or `{}` when disabled", body = DelegationStats),
        (status = 400, description = "Unknown network", body = Error),
        (status = 503, description = "Indexer unavailable", body = Error)
    )
)]
#[get("/delegation/stats")]
pub async fn delegation_stats(
    state: web::Data<HttpState>,
    network: RequestNetwork,
) -> ApiResult<HttpResponse> {
    let RequestNetwork(network) = network;
    Ok(match state.delegation.delegation_stats(network).await? {
        Some(stats) => HttpResponse::Ok().json(stats),
        None => HttpResponse::Ok().json(Map::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Network;
    use crate::inbound::http::network::NETWORK_HEADER;
    use crate::inbound::http::test_utils::{MockPorts, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn stats() -> DelegationStats {
        DelegationStats {
            total_delegated_balance: "1250000000000000".to_owned(),
            total_delegated_votes: 4,
            total_delegates: 2,
            total_delegators: 3,
        }
    }

    async fn get(ports: MockPorts, network: Option<&str>) -> (StatusCode, Value) {
        let app =
            actix_test::init_service(test_app(ports.into_state()).service(delegation_stats))
                .await;
        let mut request = actix_test::TestRequest::get().uri("/delegation/stats");
        if let Some(network) = network {
            request = request.insert_header((NETWORK_HEADER, network));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        (status, actix_test::read_body_json(response).await)
    }

    #[rstest]
    #[actix_web::test]
    async fn returns_stats_for_the_header_network() {
        let mut ports = MockPorts::default();
        ports
            .delegation
            .expect_delegation_stats()
            .withf(|network| *network == Network::Kusama)
            .returning(|_| Ok(Some(stats())));
        let (status, body) = get(ports, Some("kusama")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalDelegatedBalance"], json!("1250000000000000"));
        assert_eq!(body["totalDelegators"], json!(3));
    }

    #[rstest]
    #[actix_web::test]
    async fn disabled_reads_render_an_empty_object() {
        let mut ports = MockPorts::default();
        ports
            .delegation
            .expect_delegation_stats()
            .withf(|network| *network == Network::Polkadot)
            .returning(|_| Ok(None));
        let (status, body) = get(ports, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_network_is_rejected_before_lookup() {
        let mut ports = MockPorts::default();
        ports.delegation.expect_delegation_stats().times(0);
        let (status, body) = get(ports, Some("ethereum")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("invalid_request"));
    }
}
