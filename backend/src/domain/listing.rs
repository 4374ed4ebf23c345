//! Filter, ordering, and paging options for post listings.
//!
//! Listings are totally ordered: ties on the sort key are broken by
//! `post_id` and then the `proposal_type` wire name, both in the requested
//! direction, so offset and cursor pages partition a result set without gaps
//! or repeats. Titles and wire names compare bytewise.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use pagination::{Cursor, CursorError, PageParams};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::post::{Network, OffChainPostTopic, Post, ProposalType};

/// Equality filters shared by listing and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostFilter {
    /// Chain to list; always applied.
    pub network: Network,
    /// Only posts of this kind.
    pub proposal_type: Option<ProposalType>,
    /// Only posts with this topic.
    pub topic: Option<OffChainPostTopic>,
    /// Only posts owned by this account.
    pub user_id: Option<u64>,
}

impl PostFilter {
    /// Filter matching every post on `network`.
    pub const fn network(network: Network) -> Self {
        Self {
            network,
            proposal_type: None,
            topic: None,
            user_id: None,
        }
    }

    /// Whether `post` satisfies every present filter.
    pub fn matches(&self, post: &Post) -> bool {
        post.key.network == self.network
            && self
                .proposal_type
                .is_none_or(|kind| post.key.proposal_type == kind)
            && self.topic.is_none_or(|topic| post.topic == Some(topic))
            && self.user_id.is_none_or(|user_id| post.user_id == user_id)
    }
}

/// Filter predicate for counting posts; identical to a listing's filter.
pub type PostCountQuery = PostFilter;

/// Column a listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PostSortBy {
    /// Creation time.
    #[default]
    CreatedAt,
    /// Last modification time.
    UpdatedAt,
    /// Title, compared bytewise.
    Title,
}

/// Direction of a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

/// Sort-key value of one row, as carried in a cursor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortValue {
    /// A timestamp column.
    At(DateTime<Utc>),
    /// The title column.
    Title(String),
}

/// Position of a row in a listing's total order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCursorKey {
    /// Value of the sort column.
    pub sort: SortValue,
    /// First tie-breaker.
    pub post_id: u64,
    /// Second tie-breaker.
    pub proposal_type: ProposalType,
}

impl PostCursorKey {
    /// Encode as an opaque client token.
    pub fn encode(&self) -> Result<String, CursorError> {
        Cursor::new(self.clone()).encode()
    }

    /// Decode a token produced by [`PostCursorKey::encode`].
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        Cursor::decode(token).map(Cursor::into_inner)
    }
}

/// Where a page starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStart {
    /// Skip this many rows of the ordered result set.
    Offset(u64),
    /// Resume strictly after this row.
    After(PostCursorKey),
}

impl Default for PageStart {
    fn default() -> Self {
        Self::Offset(0)
    }
}

/// Listing request.
///
/// # Examples
/// ```
/// use backend::domain::{Network, PostListQuery, PostSortBy, SortOrder};
///
/// let query = PostListQuery::new(Network::Kusama);
/// assert_eq!(query.sort_by, PostSortBy::CreatedAt);
/// assert_eq!(query.order, SortOrder::Desc);
/// assert_eq!(query.page.limit(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListQuery {
    /// Rows to include.
    pub filter: PostFilter,
    /// Sort column.
    pub sort_by: PostSortBy,
    /// Sort direction, also applied to the tie-breakers.
    pub order: SortOrder,
    /// Offset or cursor the page begins at.
    pub start: PageStart,
    /// Page size.
    pub page: PageParams,
}

impl PostListQuery {
    /// Defaults: newest first, ten rows, from the beginning.
    pub fn new(network: Network) -> Self {
        Self {
            filter: PostFilter::network(network),
            sort_by: PostSortBy::default(),
            order: SortOrder::default(),
            start: PageStart::default(),
            page: PageParams::default(),
        }
    }

    /// Cursor key of `post` under this query's ordering.
    pub fn cursor_key(&self, post: &Post) -> PostCursorKey {
        PostCursorKey {
            sort: self.sort_value(post),
            post_id: post.key.post_id,
            proposal_type: post.key.proposal_type,
        }
    }

    fn sort_value(&self, post: &Post) -> SortValue {
        match self.sort_by {
            PostSortBy::CreatedAt => SortValue::At(post.created_at),
            PostSortBy::UpdatedAt => SortValue::At(post.updated_at),
            PostSortBy::Title => SortValue::Title(post.title.as_ref().to_owned()),
        }
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Whether `cursor` carries a sort value of this query's sort column.
    pub fn accepts_cursor(&self, cursor: &PostCursorKey) -> bool {
        matches!(
            (self.sort_by, &cursor.sort),
            (PostSortBy::CreatedAt | PostSortBy::UpdatedAt, SortValue::At(_))
                | (PostSortBy::Title, SortValue::Title(_))
        )
    }

    /// Compare two cursor keys in listing order.
    pub fn compare_keys(&self, a: &PostCursorKey, b: &PostCursorKey) -> Ordering {
        let natural = a
            .sort
            .cmp(&b.sort)
            .then_with(|| a.post_id.cmp(&b.post_id))
            .then_with(|| a.proposal_type.as_str().cmp(b.proposal_type.as_str()));
        self.directed(natural)
    }

    /// Compare two posts in listing order.
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        self.compare_keys(&self.cursor_key(a), &self.cursor_key(b))
    }

    /// Whether `post` sorts strictly after `cursor`.
    pub fn is_after(&self, post: &Post, cursor: &PostCursorKey) -> bool {
        self.compare_keys(&self.cursor_key(post), cursor) == Ordering::Greater
    }
}
