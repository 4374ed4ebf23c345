//! Process-local [`RefreshTokenLedger`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{RefreshTokenLedger, RefreshTokenLedgerError};

/// Consumed token ids with the instant their marker lapses.
#[derive(Clone)]
pub struct InMemoryRefreshTokenLedger {
    consumed: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryRefreshTokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRefreshTokenLedger {
    /// Empty ledger using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Empty ledger expiring markers against `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            consumed: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }
}

#[async_trait]
impl RefreshTokenLedger for InMemoryRefreshTokenLedger {
    async fn consume(&self, jti: &str, ttl: Duration) -> Result<bool, RefreshTokenLedgerError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|err| RefreshTokenLedgerError::backend(err.to_string()))?;
        let now = self.clock.utc();
        let mut consumed = self
            .consumed
            .lock()
            .map_err(|_| RefreshTokenLedgerError::backend("ledger lock poisoned"))?;
        consumed.retain(|_, lapses_at| *lapses_at > now);
        if consumed.contains_key(jti) {
            return Ok(false);
        }
        consumed.insert(jti.to_owned(), now + ttl);
        Ok(true)
    }
}
