//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{
    MockCredentialGate, MockDelegationStatsQuery, MockIdentityEvents, MockPostsCommand,
    MockPostsQuery, MockUserProfileQuery,
};
use crate::domain::{AccessToken, GateOutcome, Network, RefreshToken, TokenPair, UserId};

use super::credentials::CookiePolicy;
use super::error::{json_error_handler, path_error_handler, query_error_handler};
use super::state::{HttpState, HttpStatePorts};

/// Mocks for every port; tests set expectations on the ones they exercise.
#[derive(Default)]
pub(crate) struct MockPorts {
    pub gate: MockCredentialGate,
    pub profile: MockUserProfileQuery,
    pub delegation: MockDelegationStatsQuery,
    pub posts: MockPostsQuery,
    pub posts_command: MockPostsCommand,
    pub identity: MockIdentityEvents,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        let ports = HttpStatePorts {
            gate: Arc::new(self.gate),
            profile: Arc::new(self.profile),
            delegation: Arc::new(self.delegation),
            posts: Arc::new(self.posts),
            posts_command: Arc::new(self.posts_command),
            identity: Arc::new(self.identity),
        };
        web::Data::new(HttpState::new(ports, cookie_policy(), Network::Polkadot))
    }
}

pub(crate) fn cookie_policy() -> CookiePolicy {
    CookiePolicy {
        secure: false,
        access_max_age: Duration::from_secs(900),
        refresh_max_age: Duration::from_secs(604_800),
    }
}

/// Gate outcome for `uid` carrying the given token texts.
pub(crate) fn gate_outcome(uid: &str, access: &str, refresh: &str, rotated: bool) -> GateOutcome {
    GateOutcome {
        user_id: UserId::new(uid).expect("fixture uid"),
        tokens: TokenPair {
            access: AccessToken::new(access).expect("fixture access token"),
            refresh: RefreshToken::new(refresh).expect("fixture refresh token"),
        },
        rotated,
    }
}

/// App with the handler error rendering the server installs.
pub(crate) fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
}
