//! Collection/document addressing for the in-memory store.

use std::fmt;

use crate::domain::{Network, PostKey, UserId};

/// Location of one record: `collection/document`.
///
/// # Examples
/// ```
/// use backend::domain::{Network, PostKey, ProposalType};
/// use backend::outbound::memory::DocumentPath;
///
/// let path = DocumentPath::post(&PostKey::new(Network::Kusama, ProposalType::Tips, 12));
/// assert_eq!(path.to_string(), "posts_kusama/tips_12");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: String,
    document: String,
}

impl DocumentPath {
    /// Path of a user profile: `users/{uid}`.
    pub fn user(id: &UserId) -> Self {
        Self {
            collection: "users".to_owned(),
            document: id.to_string(),
        }
    }

    /// Path of a post: `posts_{network}/{proposal_type}_{post_id}`.
    pub fn post(key: &PostKey) -> Self {
        Self {
            collection: Self::posts_collection(key.network),
            document: format!("{}_{}", key.proposal_type, key.post_id),
        }
    }

    /// Collection holding every post of `network`.
    pub fn posts_collection(network: Network) -> String {
        format!("posts_{network}")
    }

    /// Collection segment.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Document segment.
    pub fn document(&self) -> &str {
        &self.document
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.document)
    }
}
