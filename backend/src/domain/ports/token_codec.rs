//! Port for issuing and verifying signed credentials.
use crate::domain::{TokenClaims, TokenKind, UserId};

use super::define_port_error;

define_port_error! {
    /// Token codec failures.
    pub enum TokenCodecError {
        /// The token was well formed but is past its expiry.
        Expired => "token expired",
        /// The token is malformed, forged, or of the wrong kind.
        Invalid { message: String } => "token invalid: {message}",
        /// A token could not be signed.
        Issue { message: String } => "token could not be issued: {message}",
    }
}

/// Freshly signed token and the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token text.
    pub token: String,
    /// Claims signed into `token`.
    pub claims: TokenClaims,
}

/// Signs and verifies credential tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a new token of `kind` for `user_id`.
    fn issue(&self, user_id: &UserId, kind: TokenKind) -> Result<IssuedToken, TokenCodecError>;

    /// Check signature, expiry, and kind.
    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenCodecError>;
}
