//! Redis-backed [`RefreshTokenLedger`] using `SET key 1 NX EX ttl`.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis;

use crate::domain::ports::{RefreshTokenLedger, RefreshTokenLedgerError};

const KEY_PREFIX: &str = "refresh_token_used";

/// Shared ledger so a refresh token is single-use across API nodes.
#[derive(Clone)]
pub struct RedisRefreshTokenLedger {
    pool: Pool<RedisConnectionManager>,
}

impl RedisRefreshTokenLedger {
    /// Ledger over `pool`.
    pub fn new(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }
}

fn ledger_key(jti: &str) -> String {
    format!("{KEY_PREFIX}:{jti}")
}

#[async_trait]
impl RefreshTokenLedger for RedisRefreshTokenLedger {
    async fn consume(&self, jti: &str, ttl: Duration) -> Result<bool, RefreshTokenLedgerError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| RefreshTokenLedgerError::backend(err.to_string()))?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(ledger_key(jti))
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut *conn)
            .await
            .map_err(|err| RefreshTokenLedgerError::backend(err.to_string()))?;
        Ok(reply.is_some())
    }
}
