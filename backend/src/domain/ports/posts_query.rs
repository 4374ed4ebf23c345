//! Driving port for post reads.

use async_trait::async_trait;

use crate::domain::{Error, Post, PostCursorKey, PostKey, PostListQuery};

/// One page of a post listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPage {
    /// Rows of this page, in listing order.
    pub posts: Vec<Post>,
    /// Rows matching the filter across all pages.
    pub total_count: u64,
    /// Position to resume from; absent on the last page.
    pub next: Option<PostCursorKey>,
}

/// Driving port for post reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostsQuery: Send + Sync {
    /// Load one post; `NotFound` when absent.
    async fn get_post(&self, key: &PostKey) -> Result<Post, Error>;

    /// Load one page plus the total match count.
    async fn list_posts(&self, query: &PostListQuery) -> Result<PostPage, Error>;
}
