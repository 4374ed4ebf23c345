//! HS256 JSON Web Token implementation of [`TokenCodec`].
//!
//! Expiry is checked against the injected clock rather than the system
//! time so tests can move time deterministically.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::{Clock, DefaultClock};
use uuid::Uuid;

use crate::domain::ports::{IssuedToken, TokenCodec, TokenCodecError};
use crate::domain::{TokenClaims, TokenKind, UserId};

/// Lifetimes of issued credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtls {
    /// Lifetime of access tokens.
    pub access: Duration,
    /// Lifetime of refresh tokens.
    pub refresh: Duration,
}

impl Default for TokenTtls {
    /// Fifteen-minute access tokens, seven-day refresh tokens.
    fn default() -> Self {
        Self {
            access: Duration::from_secs(15 * 60),
            refresh: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

impl TokenTtls {
    fn for_kind(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access,
            TokenKind::Refresh => self.refresh,
        }
    }
}

/// Signs and verifies tokens with one shared secret.
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttls: TokenTtls,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    /// HS256 codec keyed by `secret`, stamping claims with the system clock.
    pub fn new(secret: &[u8], ttls: TokenTtls) -> Self {
        Self::with_clock(secret, ttls, Arc::new(DefaultClock))
    }

    /// As [`Self::new`], reading the time from `clock`.
    pub fn with_clock(secret: &[u8], ttls: TokenTtls, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttls,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

fn map_decode_error(error: &jsonwebtoken::errors::Error) -> TokenCodecError {
    match error.kind() {
        ErrorKind::ExpiredSignature => TokenCodecError::expired(),
        _ => TokenCodecError::invalid(error.to_string()),
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, user_id: &UserId, kind: TokenKind) -> Result<IssuedToken, TokenCodecError> {
        let iat = self.clock.utc().timestamp();
        let ttl = i64::try_from(self.ttls.for_kind(kind).as_secs())
            .map_err(|err| TokenCodecError::issue(err.to_string()))?;
        let claims = TokenClaims {
            sub: user_id.to_string(),
            kind,
            jti: Uuid::new_v4().to_string(),
            iat,
            exp: iat.saturating_add(ttl),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenCodecError::issue(err.to_string()))?;
        Ok(IssuedToken { token, claims })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenCodecError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &Self::validation())
            .map_err(|err| map_decode_error(&err))?;
        let claims = data.claims;
        if claims.kind != kind {
            return Err(TokenCodecError::invalid("token kind mismatch"));
        }
        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenCodecError::expired());
        }
        Ok(claims)
    }
}
