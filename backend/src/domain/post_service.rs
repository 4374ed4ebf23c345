//! Post read and write use cases.
//!
//! Search indexing after a create is best-effort: the post is already
//! committed, so an indexing failure is logged and the create succeeds.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageParams;
use tracing::{info, warn};

use crate::domain::ports::{PostPage, PostRepository, PostsCommand, PostsQuery, SearchIndex};
use crate::domain::{Error, NewPost, PageStart, Post, PostKey, PostListQuery};

/// Post use cases over a [`PostRepository`], with optional search indexing.
#[derive(Clone)]
pub struct PostService<R: ?Sized> {
    posts: Arc<R>,
    search: Option<Arc<dyn SearchIndex>>,
}

impl<R: ?Sized> PostService<R> {
    /// Pass `None` for `search` to skip indexing.
    pub fn new(posts: Arc<R>, search: Option<Arc<dyn SearchIndex>>) -> Self {
        Self { posts, search }
    }
}

impl<R> PostService<R>
where
    R: PostRepository + ?Sized,
{
    /// Whether any row follows `last` under `query`'s ordering.
    async fn has_more(&self, query: &PostListQuery, last: &Post) -> Result<bool, Error> {
        let mut lookahead = query.clone();
        lookahead.start = PageStart::After(query.cursor_key(last));
        lookahead.page = PageParams::new(Some(1)).map_err(|err| Error::internal(err.to_string()))?;
        Ok(!self.posts.list(&lookahead).await?.is_empty())
    }
}

#[async_trait]
impl<R> PostsQuery for PostService<R>
where
    R: PostRepository + ?Sized,
{
    async fn get_post(&self, key: &PostKey) -> Result<Post, Error> {
        self.posts
            .find_by_key(key)
            .await?
            .ok_or_else(|| Error::not_found(format!("post {key} not found")))
    }

    async fn list_posts(&self, query: &PostListQuery) -> Result<PostPage, Error> {
        let posts = self.posts.list(query).await?;
        let total_count = self.posts.count(&query.filter).await?;
        let next = match posts.last() {
            Some(last) if posts.len() == query.page.limit() && self.has_more(query, last).await? => {
                Some(query.cursor_key(last))
            }
            _ => None,
        };
        Ok(PostPage {
            posts,
            total_count,
            next,
        })
    }
}

#[async_trait]
impl<R> PostsCommand for PostService<R>
where
    R: PostRepository + ?Sized,
{
    async fn create_post(&self, post: NewPost) -> Result<Post, Error> {
        let created = self.posts.create(post).await?;
        info!(post = %created.key, "post created");
        if let Some(search) = &self.search {
            if let Err(err) = search.index_post(&created).await {
                warn!(post = %created.key, error = %err, "search indexing failed");
            }
        }
        Ok(created)
    }
}
