//! Credential gate: validate the access token or rotate via refresh.
//!
//! Rotation consumes the refresh token's id in the ledger before new
//! tokens are issued, so of two concurrent requests presenting the same
//! refresh token exactly one proceeds. The guarded operation runs only
//! after [`CredentialGate::authenticate`] returns.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{CredentialGate, RefreshTokenLedger, TokenCodec, TokenCodecError};
use crate::domain::{
    AccessToken, Error, GateOutcome, PresentedCredentials, RefreshToken, TokenKind, TokenPair,
    UserId,
};

/// Shortest marker lifetime written to the ledger.
const MIN_LEDGER_TTL: Duration = Duration::from_secs(1);

/// Credential gate over a token codec and a refresh-token ledger.
#[derive(Clone)]
pub struct AuthGateService<T: ?Sized, L: ?Sized> {
    codec: Arc<T>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<T: ?Sized, L: ?Sized> AuthGateService<T, L> {
    /// Create the gate; `clock` supplies the current time for expiry checks.
    pub fn new(codec: Arc<T>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            codec,
            ledger,
            clock,
        }
    }
}

fn subject(sub: String) -> Result<UserId, Error> {
    UserId::new(sub).map_err(|_| Error::unauthorized("token subject is invalid"))
}

fn rejected(error: &TokenCodecError) -> Error {
    match error {
        TokenCodecError::Expired => Error::unauthorized("refresh token expired"),
        TokenCodecError::Invalid { .. } => Error::unauthorized("refresh token invalid"),
        TokenCodecError::Issue { message } => Error::internal(message.clone()),
    }
}

impl<T, L> AuthGateService<T, L>
where
    T: TokenCodec + ?Sized,
    L: RefreshTokenLedger + ?Sized,
{
    fn issue_pair(&self, user_id: &UserId) -> Result<TokenPair, Error> {
        let issue = |kind| {
            self.codec
                .issue(user_id, kind)
                .map_err(|err| Error::internal(err.to_string()))
        };
        let access = issue(TokenKind::Access)?;
        let refresh = issue(TokenKind::Refresh)?;
        Ok(TokenPair {
            access: AccessToken::new(access.token)
                .map_err(|err| Error::internal(err.to_string()))?,
            refresh: RefreshToken::new(refresh.token)
                .map_err(|err| Error::internal(err.to_string()))?,
        })
    }

    async fn rotate(&self, refresh: &RefreshToken) -> Result<GateOutcome, Error> {
        let claims = self
            .codec
            .verify(refresh.expose(), TokenKind::Refresh)
            .map_err(|err| rejected(&err))?;
        let user_id = subject(claims.sub.clone())?;
        let ttl = Duration::from_secs(claims.remaining_secs(self.clock.utc().timestamp()))
            .max(MIN_LEDGER_TTL);
        let first_use = self
            .ledger
            .consume(&claims.jti, ttl)
            .await
            .map_err(|err| Error::service_unavailable(err.to_string()))?;
        if !first_use {
            warn!(user_id = %user_id, "refresh token replayed");
            return Err(Error::unauthorized("refresh token already used"));
        }
        let tokens = self.issue_pair(&user_id)?;
        info!(user_id = %user_id, "credentials rotated");
        Ok(GateOutcome {
            user_id,
            tokens,
            rotated: true,
        })
    }
}

#[async_trait]
impl<T, L> CredentialGate for AuthGateService<T, L>
where
    T: TokenCodec + ?Sized,
    L: RefreshTokenLedger + ?Sized,
{
    async fn authenticate(&self, credentials: PresentedCredentials) -> Result<GateOutcome, Error> {
        let PresentedCredentials { access, refresh } = credentials;
        let Some(refresh) = refresh else {
            return Err(Error::unauthorized("authentication required"));
        };

        if let Some(access) = access {
            match self.codec.verify(access.expose(), TokenKind::Access) {
                Ok(claims) => {
                    return Ok(GateOutcome {
                        user_id: subject(claims.sub)?,
                        tokens: TokenPair { access, refresh },
                        rotated: false,
                    });
                }
                Err(TokenCodecError::Issue { message }) => return Err(Error::internal(message)),
                Err(err) => debug!(error = %err, "access token rejected; attempting refresh"),
            }
        }

        self.rotate(&refresh).await
    }
}
