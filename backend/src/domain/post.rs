//! Governance post entity and its vocabulary.
//!
//! A post is addressed by its composite [`PostKey`]; the bare numeric id
//! recurs across networks and proposal types. Engagement counters live in
//! [`PostMetrics`] and only ever move through [`MetricsDelta`] increments.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Longest accepted post title.
pub const TITLE_MAX: usize = 300;

/// Validation errors for post components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// The title is blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// The title is longer than [`TITLE_MAX`].
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum permitted length.
        max: usize,
    },
    /// The proposer address is blank.
    #[error("proposer address must not be empty")]
    EmptyProposerAddress,
    /// A wire name does not match any variant.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant {
        /// Vocabulary being parsed.
        kind: &'static str,
        /// Rejected wire name.
        value: String,
    },
    /// A delta would drive a counter below zero.
    #[error("{field} count would become negative")]
    NegativeMetric {
        /// Counter name.
        field: &'static str,
    },
    /// A counter would exceed [`METRIC_MAX`].
    #[error("{field} count overflowed")]
    MetricOverflow {
        /// Counter name.
        field: &'static str,
    },
}

/// Declares a closed vocabulary that serialises as snake_case wire names.
macro_rules! wire_enum {
    (
        $(#[$outer:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[doc = concat!("Wire name `", $wire, "`.")]
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire and storage name.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = PostValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(PostValidationError::UnknownVariant {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Supported chains.
    Network, "network" {
        Polkadot => "polkadot",
        Kusama => "kusama",
        Westend => "westend",
        Paseo => "paseo",
        Moonbeam => "moonbeam",
        Moonriver => "moonriver",
        Moonbase => "moonbase",
        Cere => "cere",
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::Polkadot
    }
}

wire_enum! {
    /// Kind of governance item a post discusses.
    ProposalType, "proposal type" {
        Discussions => "discussions",
        Grants => "grants",
        Referendums => "referendums",
        ReferendumsV2 => "referendums_v2",
        FellowshipReferendums => "fellowship_referendums",
        TreasuryProposals => "treasury_proposals",
        Bounties => "bounties",
        ChildBounties => "child_bounties",
        Tips => "tips",
        CouncilMotions => "council_motions",
        TechCommitteeProposals => "tech_committee_proposals",
        DemocracyProposals => "democracy_proposals",
    }
}

wire_enum! {
    /// Topic of an off-chain discussion.
    OffChainPostTopic, "topic" {
        Democracy => "democracy",
        General => "general",
        Governance => "governance",
        Root => "root",
        Staking => "staking",
        Treasury => "treasury",
        WhitelistedCaller => "whitelisted_caller",
        Fellowship => "fellowship",
        Council => "council",
        TechnicalCommittee => "technical_committee",
    }
}

wire_enum! {
    /// Where the post content originated.
    DataSource, "data source" {
        Polkassembly => "polkassembly",
        Subsquare => "subsquare",
        Other => "other",
    }
}

wire_enum! {
    /// Who may comment on a post.
    AllowedCommentors, "commenting policy" {
        All => "all",
        OnChainVerifiedOnly => "on_chain_verified_only",
        None => "none",
    }
}

/// Composite identity of a post.
///
/// # Examples
/// ```
/// use backend::domain::{Network, PostKey, ProposalType};
///
/// let key = PostKey::new(Network::Polkadot, ProposalType::ReferendumsV2, 123);
/// assert_eq!(key.to_string(), "polkadot/referendums_v2/123");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostKey {
    /// Chain the post belongs to.
    pub network: Network,
    /// Kind of governance item.
    pub proposal_type: ProposalType,
    /// Index of the item on chain, or the off-chain discussion id.
    pub post_id: u64,
}

impl PostKey {
    /// Assemble a key from its parts.
    pub const fn new(network: Network, proposal_type: ProposalType, post_id: u64) -> Self {
        Self {
            network,
            proposal_type,
            post_id,
        }
    }
}

impl fmt::Display for PostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.network, self.proposal_type, self.post_id)
    }
}

/// Validated post title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostTitle(String);

impl PostTitle {
    /// Trim and validate a title.
    ///
    /// # Errors
    ///
    /// Returns [`PostValidationError::EmptyTitle`] for a blank title and
    /// [`PostValidationError::TitleTooLong`] past [`TITLE_MAX`] characters.
    pub fn new(title: impl Into<String>) -> Result<Self, PostValidationError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(PostValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(title))
    }
}

impl AsRef<str> for PostTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<PostTitle> for String {
    fn from(value: PostTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostTitle {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// On-chain address of the account that proposed the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProposerAddress(String);

impl ProposerAddress {
    /// Trim and validate an address; only blank input is rejected.
    pub fn new(address: impl Into<String>) -> Result<Self, PostValidationError> {
        let address = address.into().trim().to_owned();
        if address.is_empty() {
            return Err(PostValidationError::EmptyProposerAddress);
        }
        Ok(Self(address))
    }
}

impl AsRef<str> for ProposerAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ProposerAddress> for String {
    fn from(value: ProposerAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for ProposerAddress {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Free-form label attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Label text.
    #[schema(example = "treasury")]
    pub value: String,
    /// When the label was last attached to any post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Reference from one post to another governance item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostLink {
    /// Kind of the linked item.
    pub proposal_type: ProposalType,
    /// Index of the linked item.
    pub post_id: u64,
}

/// Machine-generated summary of the post body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    /// Summary text.
    pub summary: String,
    /// When the summary was generated.
    pub created_at: DateTime<Utc>,
}

/// Engagement counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PostMetrics {
    /// Number of comments.
    pub comments: u64,
    /// Number of reactions.
    pub reactions: u64,
    /// Number of votes.
    pub votes: u64,
}

/// Signed per-counter adjustment applied atomically by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MetricsDelta {
    /// Change to the comment count.
    pub comments: i64,
    /// Change to the reaction count.
    pub reactions: i64,
    /// Change to the vote count.
    pub votes: i64,
}

impl MetricsDelta {
    /// Whether every component is zero.
    pub const fn is_zero(&self) -> bool {
        self.comments == 0 && self.reactions == 0 && self.votes == 0
    }
}

/// Largest count any store can hold; counters are BIGINT columns.
pub const METRIC_MAX: u64 = i64::MAX.unsigned_abs();

fn adjust(current: u64, delta: i64, field: &'static str) -> Result<u64, PostValidationError> {
    if delta >= 0 {
        current
            .checked_add(delta.unsigned_abs())
            .filter(|next| *next <= METRIC_MAX)
            .ok_or(PostValidationError::MetricOverflow { field })
    } else {
        current
            .checked_sub(delta.unsigned_abs())
            .ok_or(PostValidationError::NegativeMetric { field })
    }
}

impl PostMetrics {
    /// Counters after applying `delta`; all components or none.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{MetricsDelta, PostMetrics};
    ///
    /// let metrics = PostMetrics::default()
    ///     .checked_apply(MetricsDelta { comments: 2, ..MetricsDelta::default() })
    ///     .expect("positive delta");
    /// assert_eq!(metrics.comments, 2);
    /// assert!(metrics.checked_apply(MetricsDelta { votes: -1, ..MetricsDelta::default() }).is_err());
    /// ```
    pub fn checked_apply(self, delta: MetricsDelta) -> Result<Self, PostValidationError> {
        Ok(Self {
            comments: adjust(self.comments, delta.comments, "comments")?,
            reactions: adjust(self.reactions, delta.reactions, "reactions")?,
            votes: adjust(self.votes, delta.votes, "votes")?,
        })
    }
}

/// Input for creating a post. Timestamps and metrics are server-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Identity of the post; must not already exist.
    pub key: PostKey,
    /// Validated title.
    pub title: PostTitle,
    /// Body text, markdown.
    pub content: String,
    /// Address of the on-chain proposer.
    pub proposer_address: ProposerAddress,
    /// Numeric id of the owning account.
    pub user_id: u64,
    /// Labels attached to the post.
    pub tags: Vec<Tag>,
    /// Discussion topic, for off-chain posts.
    pub topic: Option<OffChainPostTopic>,
}

impl NewPost {
    /// Materialise the post at `now` with zeroed metrics.
    pub fn into_post(self, now: DateTime<Utc>) -> Post {
        Post {
            key: self.key,
            title: self.title,
            content: self.content,
            proposer_address: self.proposer_address,
            user_id: self.user_id,
            created_at: now,
            updated_at: now,
            tags: self.tags,
            topic: self.topic,
            source: Some(DataSource::Polkassembly),
            allowed_commentors: Some(AllowedCommentors::All),
            summary: None,
            metrics: PostMetrics::default(),
            links: Vec::new(),
        }
    }
}

/// Partial post update. An empty update only refreshes `updated_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUpdate {
    /// Replacement title.
    pub title: Option<PostTitle>,
    /// Replacement body.
    pub content: Option<String>,
    /// Replacement tag set.
    pub tags: Option<Vec<Tag>>,
    /// Replacement topic.
    pub topic: Option<OffChainPostTopic>,
    /// Replacement commenting policy.
    pub allowed_commentors: Option<AllowedCommentors>,
    /// Replacement summary.
    pub summary: Option<ContentSummary>,
}

/// Persisted governance post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Identity; serialised inline as `network`, `proposalType` and `postId`.
    #[serde(flatten)]
    pub key: PostKey,
    /// Validated title.
    #[schema(value_type = String, example = "Increase treasury spend limit")]
    pub title: PostTitle,
    /// Body text, markdown.
    pub content: String,
    /// Address of the on-chain proposer.
    #[schema(value_type = String)]
    pub proposer_address: ProposerAddress,
    /// Numeric id of the owning account.
    pub user_id: u64,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    /// Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
    /// Labels attached to the post.
    pub tags: Vec<Tag>,
    /// Discussion topic, for off-chain posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<OffChainPostTopic>,
    /// Origin of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DataSource>,
    /// Who may comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_commentors: Option<AllowedCommentors>,
    /// Generated summary, once available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ContentSummary>,
    /// Engagement counters, changed only through metric deltas.
    pub metrics: PostMetrics,
    /// Related governance items.
    pub links: Vec<PostLink>,
}

impl Post {
    /// Merge `update` and stamp `updated_at`, never earlier than creation.
    pub fn apply(&mut self, update: PostUpdate, now: DateTime<Utc>) {
        let PostUpdate {
            title,
            content,
            tags,
            topic,
            allowed_commentors,
            summary,
        } = update;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(content) = content {
            self.content = content;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        if topic.is_some() {
            self.topic = topic;
        }
        if allowed_commentors.is_some() {
            self.allowed_commentors = allowed_commentors;
        }
        if summary.is_some() {
            self.summary = summary;
        }
        self.updated_at = now.max(self.created_at);
    }
}

#[cfg(test)]
mod tests {
    //! Vocabulary parsing, validation, and metric arithmetic.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn sample() -> NewPost {
        NewPost {
            key: PostKey::new(Network::Polkadot, ProposalType::ReferendumsV2, 123),
            title: PostTitle::new("T").expect("title"),
            content: "C".to_owned(),
            proposer_address: ProposerAddress::new("5F...").expect("address"),
            user_id: 1,
            tags: Vec::new(),
            topic: None,
        }
    }

    #[rstest]
    fn every_vocabulary_round_trips_its_wire_names() {
        for network in Network::ALL {
            assert_eq!(network.as_str().parse::<Network>(), Ok(*network));
        }
        for kind in ProposalType::ALL {
            assert_eq!(kind.as_str().parse::<ProposalType>(), Ok(*kind));
        }
    }

    #[rstest]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ProposalType::ReferendumsV2).expect("serialise");
        assert_eq!(json, "\"referendums_v2\"");
        let policy: AllowedCommentors =
            serde_json::from_str("\"on_chain_verified_only\"").expect("deserialise");
        assert_eq!(policy, AllowedCommentors::OnChainVerifiedOnly);
    }

    #[rstest]
    fn unknown_network_is_rejected() {
        assert_eq!(
            "ethereum".parse::<Network>(),
            Err(PostValidationError::UnknownVariant {
                kind: "network",
                value: "ethereum".to_owned()
            })
        );
    }

    #[rstest]
    #[case("", PostValidationError::EmptyTitle)]
    #[case("   ", PostValidationError::EmptyTitle)]
    fn title_rejects_blank(#[case] raw: &str, #[case] expected: PostValidationError) {
        assert_eq!(PostTitle::new(raw), Err(expected));
    }

    #[rstest]
    fn title_rejects_overlong() {
        assert_eq!(
            PostTitle::new("t".repeat(TITLE_MAX + 1)),
            Err(PostValidationError::TitleTooLong { max: TITLE_MAX })
        );
    }

    #[rstest]
    fn proposer_address_rejects_blank() {
        assert_eq!(
            ProposerAddress::new(" "),
            Err(PostValidationError::EmptyProposerAddress)
        );
    }

    #[rstest]
    fn new_post_starts_with_zero_metrics() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("ts");
        let post = sample().into_post(now);
        assert_eq!(post.metrics, PostMetrics::default());
        assert_eq!(post.created_at, post.updated_at);
    }

    #[rstest]
    fn negative_delta_leaves_metrics_untouched() {
        let metrics = PostMetrics {
            comments: 3,
            reactions: 0,
            votes: 1,
        };
        let delta = MetricsDelta {
            comments: 1,
            reactions: -1,
            votes: 0,
        };
        assert_eq!(
            metrics.checked_apply(delta),
            Err(PostValidationError::NegativeMetric { field: "reactions" })
        );
    }

    #[rstest]
    #[case(METRIC_MAX - 1, 1, Ok(METRIC_MAX))]
    #[case(METRIC_MAX, 1, Err(PostValidationError::MetricOverflow { field: "votes" }))]
    #[case(0, i64::MAX, Ok(METRIC_MAX))]
    #[case(METRIC_MAX, i64::MIN + 1, Ok(0))]
    fn counters_stay_within_the_storable_range(
        #[case] votes: u64,
        #[case] delta: i64,
        #[case] expected: Result<u64, PostValidationError>,
    ) {
        let metrics = PostMetrics {
            votes,
            ..PostMetrics::default()
        };
        let delta = MetricsDelta {
            votes: delta,
            ..MetricsDelta::default()
        };
        assert_eq!(
            metrics.checked_apply(delta).map(|next| next.votes),
            expected
        );
    }

    #[rstest]
    fn empty_update_only_touches_timestamp() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("ts");
        let later = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).single().expect("ts");
        let mut post = sample().into_post(created);
        let before = post.clone();
        post.apply(PostUpdate::default(), later);
        assert_eq!(post.updated_at, later);
        assert_eq!(post.title, before.title);
        assert_eq!(post.content, before.content);
    }

    #[rstest]
    fn post_serialises_flattened_key() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("ts");
        let value = serde_json::to_value(sample().into_post(now)).expect("serialise");
        assert_eq!(value["network"], "polkadot");
        assert_eq!(value["proposalType"], "referendums_v2");
        assert_eq!(value["postId"], 123);
        assert_eq!(value["metrics"]["votes"], 0);
    }
}
