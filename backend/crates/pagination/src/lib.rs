//! Opaque cursor and pagination envelope primitives.
//!
//! List endpoints page through ordered result sets either by offset or by an
//! opaque cursor. Cursors wrap the ordering key of the last row on a page and
//! are serialised as URL-safe base64 JSON so clients treat them as tokens
//! rather than structured data.
//!
//! ```
//! use pagination::{Cursor, PageParams};
//!
//! let cursor = Cursor::new((42_u64, "referendums_v2".to_owned()));
//! let token = cursor.encode().expect("cursor encodes");
//! let decoded: Cursor<(u64, String)> = Cursor::decode(&token).expect("cursor decodes");
//! assert_eq!(decoded.key(), cursor.key());
//!
//! let params = PageParams::new(None).expect("default limit");
//! assert_eq!(params.limit(), pagination::DEFAULT_LIMIT);
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: usize = 10;
/// Largest page size a caller may request.
pub const MAX_LIMIT: usize = 100;

const CURSOR_PARAM: &str = "cursor";
const LIMIT_PARAM: &str = "limit";

/// Errors raised while encoding or decoding cursors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The token is not valid URL-safe base64.
    #[error("cursor is not valid base64: {message}")]
    InvalidEncoding {
        /// Underlying error description.
        message: String,
    },
    /// The decoded bytes do not describe a cursor key.
    #[error("cursor payload is malformed: {message}")]
    InvalidPayload {
        /// Underlying error description.
        message: String,
    },
    /// The key could not be serialised.
    #[error("cursor key could not be serialised: {message}")]
    Serialize {
        /// Underlying error description.
        message: String,
    },
}

/// Opaque position in an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor<K> {
    key: K,
}

impl<K> Cursor<K> {
    /// Wrap the ordering key of the last row returned.
    pub const fn new(key: K) -> Self {
        Self { key }
    }

    /// Borrow the ordering key.
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Consume the cursor and return its key.
    pub fn into_inner(self) -> K {
        self.key
    }
}

impl<K: Serialize> Cursor<K> {
    /// Serialise the cursor into an opaque token.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::Serialize`] when the key cannot be rendered as
    /// JSON.
    pub fn encode(&self) -> Result<String, CursorError> {
        let bytes = serde_json::to_vec(&self.key).map_err(|err| CursorError::Serialize {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

impl<K: DeserializeOwned> Cursor<K> {
    /// Parse an opaque token produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns [`CursorError::InvalidEncoding`] or
    /// [`CursorError::InvalidPayload`] for tampered or foreign tokens.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|err| CursorError::InvalidEncoding {
                message: err.to_string(),
            })?;
        let key = serde_json::from_slice(&bytes).map_err(|err| CursorError::InvalidPayload {
            message: err.to_string(),
        })?;
        Ok(Self { key })
    }
}

/// Errors raised when validating page parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageParamsError {
    /// A page must hold at least one row.
    #[error("limit must be greater than zero")]
    ZeroLimit,
    /// The requested page is larger than the service allows.
    #[error("limit must not exceed {max}")]
    LimitTooLarge {
        /// Maximum permitted page size.
        max: usize,
    },
}

/// Validated page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    limit: usize,
}

impl PageParams {
    /// Validate an optional limit, applying [`DEFAULT_LIMIT`] when absent.
    ///
    /// # Errors
    ///
    /// Returns [`PageParamsError`] for zero or oversized limits.
    pub fn new(limit: Option<usize>) -> Result<Self, PageParamsError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if limit == 0 {
            return Err(PageParamsError::ZeroLimit);
        }
        if limit > MAX_LIMIT {
            return Err(PageParamsError::LimitTooLarge { max: MAX_LIMIT });
        }
        Ok(Self { limit })
    }

    /// Number of rows per page.
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Hypermedia links attached to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLinks {
    /// Link to the current page.
    #[serde(rename = "self")]
    pub self_: String,
    /// Link to the following page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PaginationLinks {
    /// Build links from the request URL, replacing the cursor and limit
    /// parameters for the next page while preserving every other filter.
    pub fn from_request(request_url: &Url, limit: usize, next_cursor: Option<&str>) -> Self {
        let next = next_cursor.map(|cursor| {
            let mut next_url = request_url.clone();
            let retained: Vec<(String, String)> = request_url
                .query_pairs()
                .filter(|(name, _)| name != CURSOR_PARAM && name != LIMIT_PARAM && name != "offset")
                .map(|(name, value)| (name.into_owned(), value.into_owned()))
                .collect();
            {
                let mut pairs = next_url.query_pairs_mut();
                pairs.clear();
                for (name, value) in &retained {
                    pairs.append_pair(name, value);
                }
                pairs.append_pair(LIMIT_PARAM, &limit.to_string());
                pairs.append_pair(CURSOR_PARAM, cursor);
            }
            next_url.to_string()
        });

        Self {
            self_: request_url.to_string(),
            next,
        }
    }
}

/// Page envelope returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Page size that produced this page.
    pub limit: usize,
    /// Number of rows matching the filters, independent of paging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    /// Opaque cursor for the following page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    /// Navigation links.
    pub links: PaginationLinks,
}
