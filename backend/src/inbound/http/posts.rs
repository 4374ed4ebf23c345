//! Post endpoints: single lookup, filtered listing, and authenticated create.
//!
//! Listings page either by `offset` or by the opaque `cursor` returned with
//! the previous page; supplying both is rejected. The network comes from the
//! `x-network` header like every other network-scoped route.

use std::collections::BTreeSet;

use actix_web::{HttpRequest, HttpResponse, get, http::header, post, web};
use pagination::{PageParams, Paginated, PaginationLinks};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::PostPage;
use crate::domain::{
    Error, Network, NewPost, OffChainPostTopic, PageStart, Post, PostCursorKey, PostFilter,
    PostKey, PostListQuery, PostSortBy, PostTitle, ProposalType, ProposerAddress, SortOrder, Tag,
};

use super::ApiResult;
use super::credentials::Credentials;
use super::network::RequestNetwork;
use super::state::HttpState;
use super::validation::{FieldErrorCode, field_error};

/// Query string accepted by `GET /posts`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPostsParams {
    /// Only posts of this kind.
    pub proposal_type: Option<ProposalType>,
    /// Only posts with this topic.
    pub topic: Option<OffChainPostTopic>,
    /// Only posts owned by this account.
    pub user_id: Option<u64>,
    /// Sort column; `createdAt` by default.
    pub sort_by: Option<PostSortBy>,
    /// Sort direction; `desc` by default.
    pub order: Option<SortOrder>,
    /// Page size, 1 to 100; defaults to 10.
    pub limit: Option<usize>,
    /// Rows to skip. Exclusive with `cursor`.
    pub offset: Option<u64>,
    /// Token from a previous page's `nextCursor`. Exclusive with `offset`.
    pub cursor: Option<String>,
}

impl ListPostsParams {
    fn into_query(self, network: Network) -> Result<PostListQuery, Error> {
        let page = PageParams::new(self.limit)
            .map_err(|err| field_error("limit", FieldErrorCode::InvalidValue, err.to_string()))?;
        let start = match (self.offset, self.cursor) {
            (Some(_), Some(_)) => {
                return Err(field_error(
                    "cursor",
                    FieldErrorCode::Conflicting,
                    "offset and cursor cannot be combined",
                ));
            }
            (Some(offset), None) => PageStart::Offset(offset),
            (None, Some(token)) => PageStart::After(PostCursorKey::decode(&token).map_err(
                |err| field_error("cursor", FieldErrorCode::InvalidCursor, err.to_string()),
            )?),
            (None, None) => PageStart::default(),
        };
        let query = PostListQuery {
            filter: PostFilter {
                network,
                proposal_type: self.proposal_type,
                topic: self.topic,
                user_id: self.user_id,
            },
            sort_by: self.sort_by.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
            start,
            page,
        };
        if let PageStart::After(cursor) = &query.start {
            if !query.accepts_cursor(cursor) {
                return Err(field_error(
                    "cursor",
                    FieldErrorCode::InvalidCursor,
                    "cursor was issued for a different sort order",
                ));
            }
        }
        Ok(query)
    }
}

fn envelope(req: &HttpRequest, limit: usize, page: PostPage) -> Result<Paginated<Post>, Error> {
    let PostPage {
        posts,
        total_count,
        next,
    } = page;
    let next_cursor = next
        .map(|key| key.encode())
        .transpose()
        .map_err(|err| Error::internal(format!("failed to encode cursor: {err}")))?;
    let links = PaginationLinks::from_request(&req.full_url(), limit, next_cursor.as_deref());
    Ok(Paginated {
        data: posts,
        limit,
        total_count: Some(total_count),
        next_cursor,
        links,
    })
}

/// List posts on the request network.
#[utoipa::path(
    get,
    path = "/api/v2/posts",
    tags = ["posts"],
    params(
        ListPostsParams,
        ("x-network" = Option<String>, Header, description = "Target network; defaults to the configured network")
    ),
    responses(
        (status = 200, description = "Page envelope: `data`, `limit`, `totalCount`, `nextCursor`, `links`"),
        (status = 400, description = "Invalid filter, limit, or cursor", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    )
)]
#[get("/posts")]
pub async fn list_posts(
    req: HttpRequest,
    state: web::Data<HttpState>,
    network: RequestNetwork,
    params: web::Query<ListPostsParams>,
) -> ApiResult<web::Json<Paginated<Post>>> {
    let RequestNetwork(network) = network;
    let query = params.into_inner().into_query(network)?;
    let page = state.posts.list_posts(&query).await?;
    envelope(&req, query.page.limit(), page).map(web::Json)
}

/// Fetch one post by its composite key.
#[utoipa::path(
    get,
    path = "/api/v2/posts/{network}/{proposal_type}/{post_id}",
    tags = ["posts"],
    params(
        ("network" = String, Path, description = "Network wire name"),
        ("proposal_type" = String, Path, description = "Proposal type wire name"),
        ("post_id" = u64, Path, description = "Numeric post id")
    ),
    responses(
        (status = 200, description = "The post", body = Post),
        (status = 400, description = "Unknown network or proposal type", body = Error),
        (status = 404, description = "No post at this key", body = Error)
    )
)]
#[get("/posts/{network}/{proposal_type}/{post_id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    path: web::Path<(String, String, u64)>,
) -> ApiResult<web::Json<Post>> {
    let (network, proposal_type, post_id) = path.into_inner();
    let network = network
        .parse::<Network>()
        .map_err(|err| field_error("network", FieldErrorCode::InvalidValue, err.to_string()))?;
    let proposal_type = proposal_type.parse::<ProposalType>().map_err(|err| {
        field_error("proposal_type", FieldErrorCode::InvalidValue, err.to_string())
    })?;
    let key = PostKey::new(network, proposal_type, post_id);
    state.posts.get_post(&key).await.map(web::Json)
}

/// Body accepted by `POST /posts`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePostRequest {
    /// Kind of governance item.
    pub proposal_type: ProposalType,
    /// Item index; with the network and kind, the post's key.
    pub post_id: u64,
    /// Title, 1 to 300 characters after trimming.
    #[schema(example = "Increase treasury spend limit")]
    pub title: String,
    /// Body text, markdown.
    #[serde(default)]
    pub content: String,
    /// On-chain address of the proposer.
    pub proposer_address: String,
    /// Numeric account id recorded as the owner.
    ///
    /// Profiles are keyed by the identity provider's uid, which has no
    /// numeric form, so the owner cannot be derived from the credentials.
    /// The value is stored as supplied; the handler only guarantees that
    /// some authenticated caller made the request, and logs both ids.
    pub user_id: u64,
    /// Labels; trimmed, lowercased and deduplicated.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Discussion topic, for off-chain posts.
    pub topic: Option<OffChainPostTopic>,
}

impl CreatePostRequest {
    fn into_new_post(self, network: Network) -> Result<NewPost, Error> {
        let title = PostTitle::new(self.title)
            .map_err(|err| field_error("title", FieldErrorCode::InvalidValue, err.to_string()))?;
        let proposer_address = ProposerAddress::new(self.proposer_address).map_err(|err| {
            field_error(
                "proposerAddress",
                FieldErrorCode::InvalidValue,
                err.to_string(),
            )
        })?;
        let mut seen = BTreeSet::new();
        let mut tags = Vec::with_capacity(self.tags.len());
        for raw in self.tags {
            let value = raw.trim().to_lowercase();
            if value.is_empty() {
                return Err(field_error(
                    "tags",
                    FieldErrorCode::InvalidValue,
                    "tags must not be blank",
                ));
            }
            if seen.insert(value.clone()) {
                tags.push(Tag {
                    value,
                    last_used_at: None,
                });
            }
        }
        Ok(NewPost {
            key: PostKey::new(network, self.proposal_type, self.post_id),
            title,
            content: self.content,
            proposer_address,
            user_id: self.user_id,
            tags,
            topic: self.topic,
        })
    }
}

/// Create a post on the request network. Requires credentials.
///
/// The owner is the body's `userId`, not the authenticated uid; see
/// [`CreatePostRequest::user_id`].
#[utoipa::path(
    post,
    path = "/api/v2/posts",
    tags = ["posts"],
    request_body = CreatePostRequest,
    params(
        ("x-network" = Option<String>, Header, description = "Target network; defaults to the configured network")
    ),
    responses(
        (status = 201, description = "Created post; credential cookies set", body = Post),
        (status = 400, description = "Invalid body", body = Error),
        (status = 401, description = "Credentials missing or invalid", body = Error),
        (status = 409, description = "A post already exists at this key", body = Error)
    )
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    credentials: Credentials,
    network: RequestNetwork,
    body: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let RequestNetwork(network) = network;
    let new_post = body.into_inner().into_new_post(network)?;
    let outcome = state.gate.authenticate(credentials.into_inner()).await?;
    info!(
        caller = %outcome.user_id,
        owner = new_post.user_id,
        post = %new_post.key,
        "creating post"
    );
    let result = state
        .posts_command
        .create_post(new_post)
        .await
        .map(|created| {
            HttpResponse::Created()
                .insert_header((header::LOCATION, format!("/api/v2/posts/{}", created.key)))
                .json(created)
        });
    Ok(state.cookies.finish(&outcome.tokens, result))
}
