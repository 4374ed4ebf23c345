//! Driving port for post writes.

use async_trait::async_trait;

use crate::domain::{Error, NewPost, Post};

/// Driving port for post writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostsCommand: Send + Sync {
    /// Persist a new post and make it searchable.
    async fn create_post(&self, post: NewPost) -> Result<Post, Error>;
}
