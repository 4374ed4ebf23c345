//! Credential primitives used by the token gate.
//!
//! Token strings are opaque to the domain; only a [`TokenCodec`] adapter
//! knows their format. Raw token text is zeroised on drop and never
//! rendered by `Debug`.
//!
//! [`TokenCodec`]: crate::domain::ports::TokenCodec

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::UserId;

/// Validation errors for credential input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// The token text is blank.
    #[error("token must not be empty")]
    EmptyToken,
}

macro_rules! opaque_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(Zeroizing<String>);

        impl $name {
            /// Wrap raw token text, rejecting blank values.
            pub fn new(token: impl Into<String>) -> Result<Self, CredentialValidationError> {
                let token = token.into();
                if token.trim().is_empty() {
                    return Err(CredentialValidationError::EmptyToken);
                }
                Ok(Self(Zeroizing::new(token)))
            }

            /// Raw token text.
            pub fn expose(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(<redacted>)"))
            }
        }
    };
}

opaque_token! {
    /// Short-lived credential presented on every request.
    AccessToken
}

opaque_token! {
    /// Long-lived, single-use credential exchanged for a new pair.
    RefreshToken
}

/// Distinguishes access from refresh tokens inside claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Presented on every request.
    Access,
    /// Exchanged once for a new pair.
    Refresh,
}

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user identifier.
    pub sub: String,
    /// Which of the pair this token is.
    pub kind: TokenKind,
    /// Unique token id; the refresh ledger keys on it.
    pub jti: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl TokenClaims {
    /// Seconds until expiry relative to `now`, floored at zero.
    pub fn remaining_secs(&self, now: i64) -> u64 {
        u64::try_from(self.exp.saturating_sub(now)).unwrap_or(0)
    }
}

/// Access and refresh credentials issued together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Fresh access token.
    pub access: AccessToken,
    /// Fresh refresh token.
    pub refresh: RefreshToken,
}

/// Credentials a caller presented; either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresentedCredentials {
    /// Access token from the `access_token` cookie.
    pub access: Option<AccessToken>,
    /// Refresh token from the `refresh_token` cookie.
    pub refresh: Option<RefreshToken>,
}

/// Successful gate decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    /// Authenticated caller.
    pub user_id: UserId,
    /// Credentials to hand back to the caller.
    pub tokens: TokenPair,
    /// Whether `tokens` were freshly issued by a refresh.
    pub rotated: bool,
}
