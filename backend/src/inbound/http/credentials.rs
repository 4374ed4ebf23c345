//! Credential cookies.
//!
//! Requests carry the access and refresh tokens as `access_token` and
//! `refresh_token` cookies. Handlers pass them to the credential gate and
//! hand the resulting pair back as `Set-Cookie` headers, so a rotation is
//! invisible to the caller.

use std::time::Duration;

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::error;

use crate::domain::{AccessToken, Error, PresentedCredentials, RefreshToken, TokenPair};

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Credentials presented with a request. Blank or absent cookies become
/// `None`; the gate decides what that means.
#[derive(Debug, Clone, Default)]
pub struct Credentials(PresentedCredentials);

impl Credentials {
    /// Unwrap the presented credentials.
    pub fn into_inner(self) -> PresentedCredentials {
        self.0
    }
}

impl FromRequest for Credentials {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let access = req
            .cookie(ACCESS_TOKEN_COOKIE)
            .and_then(|cookie| AccessToken::new(cookie.value()).ok());
        let refresh = req
            .cookie(REFRESH_TOKEN_COOKIE)
            .and_then(|cookie| RefreshToken::new(cookie.value()).ok());
        ready(Ok(Self(PresentedCredentials { access, refresh })))
    }
}

/// Attributes of issued credential cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Set the `Secure` attribute.
    pub secure: bool,
    /// `Max-Age` of the access cookie.
    pub access_max_age: Duration,
    /// `Max-Age` of the refresh cookie.
    pub refresh_max_age: Duration,
}

impl CookiePolicy {
    /// Render `result` and attach both credentials to it.
    ///
    /// Cookies are attached to error responses too: once the gate has
    /// rotated, the old refresh token is spent and the caller must receive
    /// the new pair whatever the guarded operation returned.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use backend::domain::{AccessToken, Error, RefreshToken, TokenPair};
    /// use backend::inbound::http::credentials::CookiePolicy;
    ///
    /// let policy = CookiePolicy {
    ///     secure: true,
    ///     access_max_age: Duration::from_secs(900),
    ///     refresh_max_age: Duration::from_secs(604_800),
    /// };
    /// let tokens = TokenPair {
    ///     access: AccessToken::new("a").expect("token"),
    ///     refresh: RefreshToken::new("r").expect("token"),
    /// };
    /// let response = policy.finish(&tokens, Err(Error::not_found("user not found")));
    /// assert_eq!(response.status().as_u16(), 404);
    /// assert_eq!(response.cookies().count(), 2);
    /// ```
    pub fn finish(&self, tokens: &TokenPair, result: Result<HttpResponse, Error>) -> HttpResponse {
        let mut response = result.unwrap_or_else(|err| err.error_response());
        for cookie in self.cookies(tokens) {
            if let Err(err) = response.add_cookie(&cookie) {
                error!(cookie = cookie.name(), error = %err, "failed to attach credential cookie");
            }
        }
        response
    }

    fn cookies(&self, tokens: &TokenPair) -> [Cookie<'static>; 2] {
        [
            self.cookie(
                ACCESS_TOKEN_COOKIE,
                tokens.access.expose(),
                self.access_max_age,
            ),
            self.cookie(
                REFRESH_TOKEN_COOKIE,
                tokens.refresh.expose(),
                self.refresh_max_age,
            ),
        ]
    }

    fn cookie(&self, name: &'static str, value: &str, max_age: Duration) -> Cookie<'static> {
        let seconds = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        Cookie::build(name, value.to_owned())
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(seconds))
            .finish()
    }
}
