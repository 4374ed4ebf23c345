//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, caches, sources, codecs) are implemented in
//! `crate::outbound`; driving ports (`*Query`, `*Command`, gates, event
//! handlers) are implemented by domain services and consumed by
//! `crate::inbound`.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod credential_gate;
mod delegation_stats_cache;
mod delegation_stats_query;
mod delegation_stats_source;
mod identity_events;
mod post_repository;
mod posts_command;
mod posts_query;
mod refresh_token_ledger;
mod repository_error;
mod search_index;
mod token_codec;
mod user_profile_query;
mod user_repository;

pub use cache_key::{CacheKey, CacheKeyValidationError};
#[cfg(test)]
pub use credential_gate::MockCredentialGate;
pub use credential_gate::CredentialGate;
#[cfg(test)]
pub use delegation_stats_cache::MockDelegationStatsCache;
pub use delegation_stats_cache::{DelegationStatsCache, DelegationStatsCacheError};
#[cfg(test)]
pub use delegation_stats_query::MockDelegationStatsQuery;
pub use delegation_stats_query::DelegationStatsQuery;
#[cfg(test)]
pub use delegation_stats_source::MockDelegationStatsSource;
pub use delegation_stats_source::{DelegationStatsSource, DelegationStatsSourceError};
#[cfg(test)]
pub use identity_events::MockIdentityEvents;
pub use identity_events::{IdentityEvents, IdentityRecord};
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::PostRepository;
#[cfg(test)]
pub use posts_command::MockPostsCommand;
pub use posts_command::PostsCommand;
#[cfg(test)]
pub use posts_query::MockPostsQuery;
pub use posts_query::{PostPage, PostsQuery};
#[cfg(test)]
pub use refresh_token_ledger::MockRefreshTokenLedger;
pub use refresh_token_ledger::{RefreshTokenLedger, RefreshTokenLedgerError};
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use search_index::MockSearchIndex;
pub use search_index::{SearchIndex, SearchIndexError};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{IssuedToken, TokenCodec, TokenCodecError};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
