//! Identity-provider webhooks.
//!
//! The provider retries on any non-2xx response, so every payload is
//! acknowledged with `204` and problems are only logged.

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::UserId;
use crate::domain::ports::IdentityRecord;

use super::state::HttpState;

/// Account fields reported when an identity is created.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityCreatedPayload {
    /// Identity-provider uid.
    #[schema(example = "zq3v9Yb1")]
    pub uid: String,
    /// Email, if the provider has one.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name, if the provider has one.
    #[serde(default)]
    pub display_name: Option<String>,
}

fn parse_record(body: &[u8]) -> Option<IdentityRecord> {
    let payload: IdentityCreatedPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "identity-created payload is not valid JSON");
            return None;
        }
    };
    match UserId::new(payload.uid) {
        Ok(uid) => Some(IdentityRecord {
            uid,
            email: payload.email,
            display_name: payload.display_name,
        }),
        Err(err) => {
            warn!(error = %err, "identity-created payload carries an unusable uid");
            None
        }
    }
}

/// Bootstrap a user profile for a newly created identity.
#[utoipa::path(
    post,
    path = "/api/v2/hooks/identity-created",
    tags = ["hooks"],
    request_body = IdentityCreatedPayload,
    responses(
        (status = 204, description = "Acknowledged, whether or not a profile was created")
    )
)]
#[post("/hooks/identity-created")]
pub async fn identity_created(state: web::Data<HttpState>, body: web::Bytes) -> HttpResponse {
    if let Some(record) = parse_record(&body) {
        state.identity.on_identity_created(record).await;
    }
    HttpResponse::NoContent().finish()
}
