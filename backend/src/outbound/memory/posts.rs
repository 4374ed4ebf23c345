//! In-memory [`PostRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tokio::sync::RwLock;

use crate::domain::ports::{PostRepository, RepositoryError};
use crate::domain::{
    MetricsDelta, NewPost, PageStart, Post, PostCountQuery, PostKey, PostListQuery, PostUpdate,
};

use super::DocumentPath;

/// Collection name to documents within it.
type Collections = HashMap<String, HashMap<String, Post>>;

/// Posts grouped into one collection per network.
#[derive(Clone)]
pub struct InMemoryPostRepository {
    collections: Arc<RwLock<Collections>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPostRepository {
    /// Empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Empty store stamping times from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }
}

fn matching<'a>(collections: &'a Collections, filter: &PostCountQuery) -> Vec<&'a Post> {
    collections
        .get(&DocumentPath::posts_collection(filter.network))
        .map(|documents| {
            documents
                .values()
                .filter(|post| filter.matches(post))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_key(&self, key: &PostKey) -> Result<Option<Post>, RepositoryError> {
        let path = DocumentPath::post(key);
        let collections = self.collections.read().await;
        Ok(collections
            .get(path.collection())
            .and_then(|documents| documents.get(path.document()))
            .cloned())
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepositoryError> {
        let path = DocumentPath::post(&post.key);
        let mut collections = self.collections.write().await;
        let documents = collections.entry(path.collection().to_owned()).or_default();
        if documents.contains_key(path.document()) {
            return Err(RepositoryError::conflict(format!("{path} already exists")));
        }
        let post = post.into_post(self.clock.utc());
        documents.insert(path.document().to_owned(), post.clone());
        Ok(post)
    }

    async fn update(&self, key: &PostKey, update: PostUpdate) -> Result<(), RepositoryError> {
        let path = DocumentPath::post(key);
        let mut collections = self.collections.write().await;
        let post = collections
            .get_mut(path.collection())
            .and_then(|documents| documents.get_mut(path.document()))
            .ok_or_else(|| RepositoryError::not_found("post"))?;
        post.apply(update, self.clock.utc());
        Ok(())
    }

    async fn delete(&self, key: &PostKey) -> Result<(), RepositoryError> {
        let path = DocumentPath::post(key);
        let mut collections = self.collections.write().await;
        collections
            .get_mut(path.collection())
            .and_then(|documents| documents.remove(path.document()))
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("post"))
    }

    async fn list(&self, query: &PostListQuery) -> Result<Vec<Post>, RepositoryError> {
        if let PageStart::After(cursor) = &query.start {
            if !query.accepts_cursor(cursor) {
                return Err(RepositoryError::validation(
                    "cursor does not match the requested sort column",
                ));
            }
        }

        let collections = self.collections.read().await;
        let mut rows = matching(&collections, &query.filter);
        rows.sort_by(|a, b| query.compare(a, b));

        let skip = match &query.start {
            PageStart::Offset(offset) => usize::try_from(*offset).unwrap_or(usize::MAX),
            PageStart::After(cursor) => rows
                .iter()
                .position(|post| query.is_after(post, cursor))
                .unwrap_or(rows.len()),
        };
        Ok(rows
            .into_iter()
            .skip(skip)
            .take(query.page.limit())
            .cloned()
            .collect())
    }

    async fn count(&self, query: &PostCountQuery) -> Result<u64, RepositoryError> {
        let collections = self.collections.read().await;
        let total = matching(&collections, query).len();
        Ok(u64::try_from(total).unwrap_or(u64::MAX))
    }

    async fn update_metrics(&self, key: &PostKey, delta: MetricsDelta) -> Result<(), RepositoryError> {
        let path = DocumentPath::post(key);
        let mut collections = self.collections.write().await;
        let post = collections
            .get_mut(path.collection())
            .and_then(|documents| documents.get_mut(path.document()))
            .ok_or_else(|| RepositoryError::not_found("post"))?;
        post.metrics = post
            .metrics
            .checked_apply(delta)
            .map_err(|err| RepositoryError::validation(err.to_string()))?;
        Ok(())
    }
}
