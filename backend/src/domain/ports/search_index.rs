//! Port for the write side of the full-text search index.
use async_trait::async_trait;

use crate::domain::Post;

use super::define_port_error;

define_port_error! {
    /// Search indexing failures.
    pub enum SearchIndexError {
        /// The index endpoint could not be reached.
        Transport { message: String } => "search index request failed: {message}",
        /// The index rejected the record.
        Rejected { status: u16, message: String } => "search index rejected record ({status}): {message}",
    }
}

/// Full-text index kept in step with created posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or replace the index record for `post`.
    async fn index_post(&self, post: &Post) -> Result<(), SearchIndexError>;
}
