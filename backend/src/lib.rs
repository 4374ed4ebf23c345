//! Governance backend library: domain model, ports, and adapters.
//!
//! - [`domain`]: entities, ports, and the services implementing driving ports.
//! - [`inbound`]: actix-web handlers translating HTTP into port calls.
//! - [`outbound`]: PostgreSQL, Redis, in-memory, indexer, search, and token
//!   adapters.
//! - [`middleware`]: request tracing.
//! - [`settings`]: process configuration.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
