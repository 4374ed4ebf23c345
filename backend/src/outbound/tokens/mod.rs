//! Credential adapters: JWT codec and single-use refresh ledgers.

mod jwt;
mod memory_ledger;
mod redis_ledger;

pub use jwt::{JwtTokenCodec, TokenTtls};
pub use memory_ledger::InMemoryRefreshTokenLedger;
pub use redis_ledger::RedisRefreshTokenLedger;
