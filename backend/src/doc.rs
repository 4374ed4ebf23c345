//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint in the inbound layer together
//! with the domain schemas they return and the cookie credentials the
//! authenticated routes read. The document backs Swagger UI in debug builds
//! and is exported by `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AllowedCommentors, ContentSummary, DataSource, DelegationStats, Error, ErrorCode, Network,
    OffChainPostTopic, Post, PostKey, PostLink, PostMetrics, PostSortBy, ProposalType,
    PublicUser, SortOrder, Tag, UserRole,
};
use crate::inbound::http::hooks::IdentityCreatedPayload;
use crate::inbound::http::posts::CreatePostRequest;

/// Adds the credential cookie security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AccessCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "access_token",
                "Short-lived signed access token.",
            ))),
        );
        components.add_security_scheme(
            "RefreshCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "refresh_token",
                "Single-use refresh token; rotated whenever the access token is renewed.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Polkassembly governance API",
        description = "Governance posts, user profiles, and delegation statistics.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::current_user,
        crate::inbound::http::delegation::delegation_stats,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::hooks::identity_created,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        PublicUser,
        UserRole,
        DelegationStats,
        Post,
        PostKey,
        PostMetrics,
        PostLink,
        ContentSummary,
        Tag,
        Network,
        ProposalType,
        OffChainPostTopic,
        DataSource,
        AllowedCommentors,
        PostSortBy,
        SortOrder,
        CreatePostRequest,
        IdentityCreatedPayload,
    )),
    tags(
        (name = "users", description = "Profile of the authenticated caller"),
        (name = "delegation", description = "Network-wide delegation totals"),
        (name = "posts", description = "Governance posts"),
        (name = "hooks", description = "Identity-provider callbacks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Shape of the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("PublicUser", "displayName")]
    #[case("DelegationStats", "totalDelegatedBalance")]
    fn schemas_expose_wire_field_names(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert_object_schema_has_field(schemas.get(schema).expect("schema registered"), field);
    }

    #[rstest]
    #[case("/api/v2/users/me")]
    #[case("/api/v2/delegation/stats")]
    #[case("/api/v2/posts")]
    #[case("/api/v2/posts/{network}/{proposal_type}/{post_id}")]
    #[case("/api/v2/hooks/identity-created")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn cookie_schemes_are_registered() {
        let doc = ApiDoc::openapi();
        let schemes = &doc.components.as_ref().expect("components").security_schemes;
        assert!(schemes.contains_key("AccessCookie"));
        assert!(schemes.contains_key("RefreshCookie"));
    }
}
