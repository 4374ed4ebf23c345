//! Port recording which refresh tokens have been spent.
use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Ledger backend failures.
    pub enum RefreshTokenLedgerError {
        /// The ledger store is unreachable.
        Backend { message: String } => "refresh token ledger failure: {message}",
    }
}

/// Single-use marker for refresh tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenLedger: Send + Sync {
    /// Atomically mark `jti` as spent.
    ///
    /// Returns `true` for exactly one caller per `jti`; every later or
    /// concurrent caller sees `false`. The marker may be forgotten after
    /// `ttl`, by which time the token itself has expired.
    async fn consume(&self, jti: &str, ttl: Duration) -> Result<bool, RefreshTokenLedgerError>;
}
