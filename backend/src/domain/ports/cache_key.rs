//! Keys for the aggregate read cache.
use thiserror::Error;

use crate::domain::Network;

const DELEGATION_STATS_PREFIX: &str = "delegation_stats";

/// Deterministic cache key derived from query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a key after checking it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Key for a network's delegation statistics.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Network;
    /// use backend::domain::ports::CacheKey;
    ///
    /// let key = CacheKey::delegation_stats(Network::Kusama);
    /// assert_eq!(key.as_str(), "delegation_stats:kusama");
    /// ```
    pub fn delegation_stats(network: Network) -> Self {
        Self(format!("{DELEGATION_STATS_PREFIX}:{network}"))
    }

    /// Key text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("cache key must not be empty")]
    Empty,
    /// Key has leading or trailing whitespace.
    #[error("cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}
