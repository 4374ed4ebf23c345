//! Port abstraction for governance post persistence.
//!
//! Deletion is a hard delete: the post and its dependent comments and
//! reactions are removed together, atomically where the store allows.
use async_trait::async_trait;

use crate::domain::{MetricsDelta, NewPost, Post, PostCountQuery, PostKey, PostListQuery, PostUpdate};

use super::RepositoryError;

/// Storage-agnostic post persistence.
///
/// Timestamps come from the adapter's clock; `updated_at` never precedes
/// `created_at`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Fetch a post by composite key; absence is `Ok(None)`.
    async fn find_by_key(&self, key: &PostKey) -> Result<Option<Post>, RepositoryError>;

    /// Insert a post with zeroed metrics; `Conflict` on a duplicate key.
    async fn create(&self, post: NewPost) -> Result<Post, RepositoryError>;

    /// Partially update a post; `NotFound` when absent.
    async fn update(&self, key: &PostKey, update: PostUpdate) -> Result<(), RepositoryError>;

    /// Hard delete a post and its children; `NotFound` when absent.
    async fn delete(&self, key: &PostKey) -> Result<(), RepositoryError>;

    /// One page of posts in the query's total order.
    async fn list(&self, query: &PostListQuery) -> Result<Vec<Post>, RepositoryError>;

    /// Number of posts matching the filter, ignoring pagination.
    async fn count(&self, query: &PostCountQuery) -> Result<u64, RepositoryError>;

    /// Apply per-counter increments atomically.
    ///
    /// A delta that would take any counter outside `0..=`[`METRIC_MAX`] is
    /// rejected with [`RepositoryError::Validation`] and nothing is written.
    ///
    /// [`METRIC_MAX`]: crate::domain::METRIC_MAX
    async fn update_metrics(&self, key: &PostKey, delta: MetricsDelta)
    -> Result<(), RepositoryError>;
}
