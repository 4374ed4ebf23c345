//! Domain primitives, ports, and services.
//!
//! Purpose: define strongly typed governance entities and the use cases
//! that operate on them, independent of transport and storage. Adapters in
//! `crate::inbound` and `crate::outbound` depend on this module, never the
//! reverse.
//!
//! Public surface:
//! - Entities: [`User`], [`Post`], [`DelegationStats`] and their value types.
//! - Listing options: [`PostListQuery`], [`PostFilter`].
//! - Credentials: [`AccessToken`], [`RefreshToken`], [`GateOutcome`].
//! - Errors: [`Error`] and [`ErrorCode`], the transport-agnostic failure.
//! - Services implementing the driving ports in [`ports`].

pub mod auth;
pub mod auth_gate;
pub mod delegation;
pub mod delegation_stats_service;
pub mod error;
pub mod listing;
pub mod ports;
pub mod post;
pub mod post_service;
pub mod trace_id;
pub mod user;
pub mod user_onboarding;
pub mod user_profile;

pub use self::auth::{
    AccessToken, CredentialValidationError, GateOutcome, PresentedCredentials, RefreshToken,
    TokenClaims, TokenKind, TokenPair,
};
pub use self::auth_gate::AuthGateService;
pub use self::delegation::DelegationStats;
pub use self::delegation_stats_service::DelegationStatsService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::listing::{
    PageStart, PostCountQuery, PostCursorKey, PostFilter, PostListQuery, PostSortBy, SortOrder,
    SortValue,
};
pub use self::post::{
    AllowedCommentors, ContentSummary, DataSource, MetricsDelta, Network, NewPost,
    OffChainPostTopic, Post, PostKey, PostLink, PostMetrics, PostTitle, PostUpdate,
    PostValidationError, ProposalType, ProposerAddress, Tag, METRIC_MAX, TITLE_MAX,
};
pub use self::post_service::PostService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, Email, NewUser, PublicUser, USER_ID_MAX, User, UserId,
    UserParts, UserRole, UserUpdate, UserValidationError,
};
pub use self::user_onboarding::UserOnboardingService;
pub use self::user_profile::UserProfileService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use backend::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u64> {
///     Err(Error::not_found("post not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
