//! HTTP inbound adapter exposing the REST endpoints under `/api/v2`.

pub mod credentials;
pub mod delegation;
pub mod error;
pub mod health;
pub mod hooks;
pub mod network;
pub mod posts;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;
pub mod users;
pub mod validation;

pub use error::ApiResult;
