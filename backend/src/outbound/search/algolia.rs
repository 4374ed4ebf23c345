//! Algolia REST client for post records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{SearchIndex, SearchIndexError};
use crate::domain::{Network, OffChainPostTopic, Post, ProposalType};

/// Index receiving governance posts.
pub const POSTS_INDEX: &str = "polkassembly_v2_posts";

/// Characters of post body copied into the record.
const CONTENT_PREVIEW_CHARS: usize = 2_000;

/// Search record for one post; `objectID` mirrors the document path.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord<'a> {
    #[serde(rename = "objectID")]
    object_id: String,
    network: Network,
    proposal_type: ProposalType,
    index: u64,
    title: &'a str,
    parsed_content: String,
    proposer: &'a str,
    user_id: u64,
    tags: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<OffChainPostTopic>,
    created_at_timestamp: i64,
    updated_at_timestamp: i64,
}

impl<'a> PostRecord<'a> {
    fn from_post(post: &'a Post) -> Self {
        Self {
            object_id: format!(
                "{}_{}_{}",
                post.key.network, post.key.proposal_type, post.key.post_id
            ),
            network: post.key.network,
            proposal_type: post.key.proposal_type,
            index: post.key.post_id,
            title: post.title.as_ref(),
            parsed_content: post.content.chars().take(CONTENT_PREVIEW_CHARS).collect(),
            proposer: post.proposer_address.as_ref(),
            user_id: post.user_id,
            tags: post.tags.iter().map(|tag| tag.value.as_str()).collect(),
            topic: post.topic,
            created_at_timestamp: post.created_at.timestamp(),
            updated_at_timestamp: post.updated_at.timestamp(),
        }
    }
}

/// Writes post records to Algolia with the admin write key.
pub struct AlgoliaSearchIndex {
    client: Client,
    base: Url,
    app_id: String,
    write_key: Zeroizing<String>,
}

impl AlgoliaSearchIndex {
    /// Client for application `app_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchIndexError::Transport`] when the HTTP client cannot
    /// be built or the application id does not form a valid host.
    pub fn new(
        app_id: &str,
        write_key: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, SearchIndexError> {
        let base = Url::parse(&format!("https://{app_id}.algolia.net/"))
            .map_err(|err| SearchIndexError::transport(err.to_string()))?;
        Self::with_base_url(app_id, write_key, timeout, base)
    }

    /// Client targeting an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SearchIndexError::Transport`] when the HTTP client cannot
    /// be built.
    pub fn with_base_url(
        app_id: &str,
        write_key: Zeroizing<String>,
        timeout: Duration,
        base: Url,
    ) -> Result<Self, SearchIndexError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SearchIndexError::transport(err.to_string()))?;
        Ok(Self {
            client,
            base,
            app_id: app_id.to_owned(),
            write_key,
        })
    }

    fn record_url(&self, object_id: &str) -> Result<Url, SearchIndexError> {
        self.base
            .join(&format!("1/indexes/{POSTS_INDEX}/{object_id}"))
            .map_err(|err| SearchIndexError::transport(err.to_string()))
    }
}

#[async_trait]
impl SearchIndex for AlgoliaSearchIndex {
    async fn index_post(&self, post: &Post) -> Result<(), SearchIndexError> {
        let record = PostRecord::from_post(post);
        let url = self.record_url(&record.object_id)?;
        debug!(object_id = %record.object_id, "indexing post");

        let response = self
            .client
            .put(url)
            .header("X-Algolia-Application-Id", self.app_id.as_str())
            .header("X-Algolia-API-Key", self.write_key.as_str())
            .json(&record)
            .send()
            .await
            .map_err(|err| SearchIndexError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SearchIndexError::rejected(
            status.as_u16(),
            body.chars().take(160).collect::<String>(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewPost, PostKey, PostTitle, ProposerAddress, Tag};
    use chrono::{TimeZone, Utc};

    fn post() -> Post {
        let at = Utc
            .with_ymd_and_hms(2025, 3, 3, 3, 3, 3)
            .single()
            .expect("timestamp");
        NewPost {
            key: PostKey::new(Network::Polkadot, ProposalType::ReferendumsV2, 123),
            title: PostTitle::new("Treasury top-up").expect("title"),
            content: "x".repeat(CONTENT_PREVIEW_CHARS + 50),
            proposer_address: ProposerAddress::new("5GrwvaEF").expect("address"),
            user_id: 9,
            tags: vec![Tag {
                value: "treasury".to_owned(),
                last_used_at: None,
            }],
            topic: None,
        }
        .into_post(at)
    }

    #[test]
    fn record_uses_document_style_object_id() {
        let post = post();
        let value = serde_json::to_value(PostRecord::from_post(&post)).expect("serialise");
        assert_eq!(value["objectID"], "polkadot_referendums_v2_123");
        assert_eq!(value["proposalType"], "referendums_v2");
        assert_eq!(value["index"], 123);
        assert_eq!(value["tags"][0], "treasury");
        assert!(value.get("topic").is_none());
        assert_eq!(
            value["parsedContent"].as_str().map(str::len),
            Some(CONTENT_PREVIEW_CHARS)
        );
    }

    #[test]
    fn record_url_targets_posts_index() {
        let index = AlgoliaSearchIndex::new(
            "APPID",
            Zeroizing::new("secret".to_owned()),
            Duration::from_secs(5),
        )
        .expect("client");
        let url = index.record_url("polkadot_tips_1").expect("url");
        assert_eq!(
            url.as_str(),
            "https://appid.algolia.net/1/indexes/polkassembly_v2_posts/polkadot_tips_1"
        );
    }
}
