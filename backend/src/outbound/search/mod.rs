//! Search index adapters.

mod algolia;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};
use zeroize::Zeroizing;

use crate::domain::ports::SearchIndex;

pub use algolia::{AlgoliaSearchIndex, POSTS_INDEX};

/// Build the search client when both credentials are configured.
///
/// Missing credentials disable indexing with a warning; a client that
/// cannot be constructed is logged and also disables indexing.
pub fn search_index_from_settings(
    app_id: Option<&str>,
    write_key: Option<Zeroizing<String>>,
    timeout: Duration,
) -> Option<Arc<dyn SearchIndex>> {
    let (Some(app_id), Some(write_key)) = (app_id.filter(|id| !id.trim().is_empty()), write_key)
    else {
        warn!("search credentials not set; skipping search index initialisation");
        return None;
    };
    if write_key.trim().is_empty() {
        warn!("search write key is blank; skipping search index initialisation");
        return None;
    }
    match AlgoliaSearchIndex::new(app_id, write_key, timeout) {
        Ok(index) => Some(Arc::new(index)),
        Err(err) => {
            error!(error = %err, "failed to initialise search client");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some("APPID"), None)]
    #[case(None, Some("secret"))]
    #[case(Some("  "), Some("secret"))]
    #[case(Some("APPID"), Some(" "))]
    fn incomplete_credentials_disable_indexing(
        #[case] app_id: Option<&str>,
        #[case] write_key: Option<&str>,
    ) {
        let key = write_key.map(|key| Zeroizing::new(key.to_owned()));
        assert!(search_index_from_settings(app_id, key, Duration::from_secs(5)).is_none());
    }

    #[rstest]
    fn complete_credentials_build_a_client() {
        let key = Some(Zeroizing::new("secret".to_owned()));
        assert!(search_index_from_settings(Some("APPID"), key, Duration::from_secs(5)).is_some());
    }
}
