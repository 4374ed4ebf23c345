//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process document store for tests and local runs
//! - **cache**: Redis and in-memory delegation stats caches
//! - **onchain**: GraphQL indexer client computing delegation totals
//! - **tokens**: JWT codec and refresh-token ledgers
//! - **search**: search index write client
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business rules.

pub mod cache;
pub mod memory;
pub mod onchain;
pub mod persistence;
pub mod search;
pub mod tokens;
