//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{DelegationConfig, ServerConfig};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::inbound::http::delegation::delegation_stats;
use backend::inbound::http::error::{json_error_handler, path_error_handler, query_error_handler};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::hooks::identity_created;
use backend::inbound::http::posts::{create_post, get_post, list_posts};
use backend::inbound::http::state::HttpState;
use backend::inbound::http::users::current_user;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v2")
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(current_user)
        .service(delegation_stats)
        .service(list_posts)
        .service(create_post)
        .service(get_post)
        .service(identity_created);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] holding the bind address, credential
///   settings, and the optional database, Redis, and search backends.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when an adapter cannot be built or binding the
/// socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let bind_addr = config.bind_addr;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Route table and readiness signalling.

    use super::*;
    use std::net::SocketAddr;
    use std::time::Duration;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use backend::domain::{Network, TRACE_ID_HEADER};
    use backend::inbound::http::token_config::TokenSettings;
    use backend::outbound::cache::CacheTtl;
    use backend::outbound::onchain::IndexerEndpoints;
    use rstest::{fixture, rstest};
    use zeroize::Zeroizing;

    #[fixture]
    fn config() -> ServerConfig {
        let tokens = TokenSettings {
            secret: Zeroizing::new(vec![7_u8; 32]),
            cookie_secure: false,
            access_ttl: Duration::from_secs(900),
            refresh_ttl: Duration::from_secs(3600),
        };
        let delegation = DelegationConfig::new(
            false,
            CacheTtl::fixed(Duration::from_secs(60)),
            IndexerEndpoints::new("http://127.0.0.1:9/{network}/graphql"),
            Duration::from_secs(1),
        );
        ServerConfig::new(
            SocketAddr::from(([127, 0, 0, 1], 0)),
            Network::Polkadot,
            tokens,
            delegation,
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn api_routes_are_mounted_under_v2(config: ServerConfig) {
        let http_state = build_http_state(&config).expect("state");
        let app = actix_test::init_service(build_app(AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state,
        }))
        .await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v2/delegation/stats")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(TRACE_ID_HEADER));

        let request = actix_test::TestRequest::get().uri("/api/v2/users/me").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_rt::test]
    async fn create_server_marks_ready(config: ServerConfig) {
        let health_state = web::Data::new(HealthState::new());
        assert!(!health_state.is_ready(), "state should start unready");
        let _server = create_server(health_state.clone(), config).expect("server should build");
        assert!(
            health_state.is_ready(),
            "server creation should mark readiness"
        );
    }
}
