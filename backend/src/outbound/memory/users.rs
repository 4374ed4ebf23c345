//! In-memory [`UserRepository`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use tokio::sync::RwLock;

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{NewUser, User, UserId, UserUpdate};

use super::DocumentPath;

/// User profiles keyed by document path.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    documents: Arc<RwLock<HashMap<DocumentPath, User>>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Empty store stamping times from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let documents = self.documents.read().await;
        Ok(documents.get(&DocumentPath::user(id)).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let path = DocumentPath::user(&user.id);
        let mut documents = self.documents.write().await;
        if documents.contains_key(&path) {
            return Err(RepositoryError::conflict(format!("{path} already exists")));
        }
        let user = user.into_user(self.clock.utc());
        documents.insert(path, user.clone());
        Ok(user)
    }

    async fn update(&self, id: &UserId, update: UserUpdate) -> Result<(), RepositoryError> {
        let mut documents = self.documents.write().await;
        let user = documents
            .get_mut(&DocumentPath::user(id))
            .ok_or_else(|| RepositoryError::not_found("user"))?;
        user.apply(update, self.clock.utc());
        Ok(())
    }
}
