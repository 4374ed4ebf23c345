//! `x-network` request header.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, Network};

use super::state::HttpState;

/// Request header naming the target network.
pub const NETWORK_HEADER: &str = "x-network";

/// Network a request targets: the `x-network` header, or the configured
/// default when the header is absent. Unknown names are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestNetwork(pub Network);

fn resolve(req: &HttpRequest) -> Result<Network, Error> {
    let default = req
        .app_data::<web::Data<HttpState>>()
        .map_or_else(Network::default, |state| state.default_network);
    let Some(value) = req.headers().get(NETWORK_HEADER) else {
        return Ok(default);
    };
    let raw = value
        .to_str()
        .map_err(|_| Error::invalid_request("x-network header must be ASCII"))?
        .trim();
    if raw.is_empty() {
        return Ok(default);
    }
    raw.to_ascii_lowercase()
        .parse()
        .map_err(|err: crate::domain::PostValidationError| Error::invalid_request(err.to_string()))
}

impl FromRequest for RequestNetwork {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map(Self))
    }
}
