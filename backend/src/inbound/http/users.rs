//! Caller profile endpoint.

use actix_web::{HttpResponse, get, web};

use crate::domain::{Error, PublicUser};

use super::ApiResult;
use super::credentials::Credentials;
use super::state::HttpState;

/// Public profile of the authenticated caller.
///
/// Credentials are validated, or rotated through the refresh token, before
/// the profile is read. The resulting pair is returned as cookies, also
/// alongside a `404`.
#[utoipa::path(
    get,
    path = "/api/v2/users/me",
    tags = ["users"],
    responses(
        (status = 200, description = "Caller profile; credential cookies set", body = PublicUser),
        (status = 401, description = "Credentials missing, invalid, or replayed", body = Error),
        (status = 404, description = "No profile exists for the caller; credential cookies set", body = Error),
        (status = 503, description = "A backing store is unavailable", body = Error)
    )
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    credentials: Credentials,
) -> ApiResult<HttpResponse> {
    let outcome = state.gate.authenticate(credentials.into_inner()).await?;
    let result = state
        .profile
        .fetch_profile(&outcome.user_id)
        .await
        .map(|profile| HttpResponse::Ok().json(profile));
    Ok(state.cookies.finish(&outcome.tokens, result))
}
