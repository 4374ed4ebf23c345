//! PostgreSQL-backed [`PostRepository`].
//!
//! Posts are addressed by the composite primary key `(network,
//! proposal_type, post_id)`. Listings page either by offset or by a keyset
//! row comparison on `(sort column, post_id, proposal_type)`, which matches
//! the domain ordering because the text columns use the "C" collation.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Text, Timestamptz};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use mockable::{Clock, DefaultClock};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::ports::{PostRepository, RepositoryError};
use crate::domain::{
    AllowedCommentors, ContentSummary, DataSource, MetricsDelta, Network, NewPost,
    OffChainPostTopic, PageStart, Post, PostCountQuery, PostCursorKey, PostFilter, PostKey,
    PostListQuery, PostMetrics, PostSortBy, PostTitle, PostUpdate, ProposalType,
    ProposerAddress, SortOrder, SortValue,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewPostRow, PostChangeset, PostRow};
use super::pool::DbPool;
use super::schema::{greatest, post_comments, post_reactions, posts};

/// Diesel implementation of the post store.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselPostRepository {
    /// Repository over `pool`, stamping times with the system clock.
    pub fn new(pool: DbPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }

    /// Use `clock` to stamp `created_at` and `updated_at`.
    pub fn with_clock(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn to_db_int(value: u64, field: &str) -> Result<i64, RepositoryError> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::validation(format!("{field} exceeds storage range")))
}

fn to_json<T: Serialize>(value: &T, field: &str) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|err| RepositoryError::validation(format!("{field} is not serialisable: {err}")))
}

fn db_key(key: &PostKey) -> Result<(&'static str, &'static str, i64), RepositoryError> {
    Ok((
        key.network.as_str(),
        key.proposal_type.as_str(),
        to_db_int(key.post_id, "post id")?,
    ))
}

fn json<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|err| err.to_string())
}

/// Decode a stored row; any malformed column is a store fault.
fn row_to_post(row: PostRow) -> Result<Post, RepositoryError> {
    let location = format!("{}/{}/{}", row.network, row.proposal_type, row.post_id);
    let corrupt =
        |detail: String| RepositoryError::query(format!("stored post {location} is invalid: {detail}"));
    let count = |value: i64, field: &str| {
        u64::try_from(value).map_err(|_| corrupt(format!("negative {field} count")))
    };
    let key = PostKey::new(
        row.network
            .parse::<Network>()
            .map_err(|err| corrupt(err.to_string()))?,
        row.proposal_type
            .parse::<ProposalType>()
            .map_err(|err| corrupt(err.to_string()))?,
        u64::try_from(row.post_id).map_err(|_| corrupt("negative post id".to_owned()))?,
    );
    let topic = row
        .topic
        .as_deref()
        .map(str::parse::<OffChainPostTopic>)
        .transpose()
        .map_err(|err| corrupt(err.to_string()))?;
    let source = row
        .source
        .as_deref()
        .map(str::parse::<DataSource>)
        .transpose()
        .map_err(|err| corrupt(err.to_string()))?;
    let allowed_commentors = row
        .allowed_commentors
        .as_deref()
        .map(str::parse::<AllowedCommentors>)
        .transpose()
        .map_err(|err| corrupt(err.to_string()))?;
    let summary = row
        .summary
        .map(json::<ContentSummary>)
        .transpose()
        .map_err(&corrupt)?;

    Ok(Post {
        key,
        title: PostTitle::new(row.title).map_err(|err| corrupt(err.to_string()))?,
        content: row.content,
        proposer_address: ProposerAddress::new(row.proposer_address)
            .map_err(|err| corrupt(err.to_string()))?,
        user_id: u64::try_from(row.user_id).map_err(|_| corrupt("negative user id".to_owned()))?,
        created_at: row.created_at,
        updated_at: row.updated_at,
        tags: json(row.tags).map_err(&corrupt)?,
        topic,
        source,
        allowed_commentors,
        summary,
        metrics: PostMetrics {
            comments: count(row.comments_count, "comments")?,
            reactions: count(row.reactions_count, "reactions")?,
            votes: count(row.votes_count, "votes")?,
        },
        links: json(row.links).map_err(&corrupt)?,
    })
}

fn filtered(filter: &PostFilter) -> Result<posts::BoxedQuery<'static, Pg>, RepositoryError> {
    let mut query = posts::table
        .into_boxed()
        .filter(posts::network.eq(filter.network.as_str()));
    if let Some(kind) = filter.proposal_type {
        query = query.filter(posts::proposal_type.eq(kind.as_str()));
    }
    if let Some(topic) = filter.topic {
        query = query.filter(posts::topic.eq(topic.as_str()));
    }
    if let Some(user_id) = filter.user_id {
        query = query.filter(posts::user_id.eq(to_db_int(user_id, "user id")?));
    }
    Ok(query)
}

fn ordered(
    query: posts::BoxedQuery<'static, Pg>,
    sort_by: PostSortBy,
    order: SortOrder,
) -> posts::BoxedQuery<'static, Pg> {
    use PostSortBy::{CreatedAt, Title, UpdatedAt};
    use SortOrder::{Asc, Desc};

    match (sort_by, order) {
        (CreatedAt, Asc) => query.order((
            posts::created_at.asc(),
            posts::post_id.asc(),
            posts::proposal_type.asc(),
        )),
        (CreatedAt, Desc) => query.order((
            posts::created_at.desc(),
            posts::post_id.desc(),
            posts::proposal_type.desc(),
        )),
        (UpdatedAt, Asc) => query.order((
            posts::updated_at.asc(),
            posts::post_id.asc(),
            posts::proposal_type.asc(),
        )),
        (UpdatedAt, Desc) => query.order((
            posts::updated_at.desc(),
            posts::post_id.desc(),
            posts::proposal_type.desc(),
        )),
        (Title, Asc) => query.order((
            posts::title.asc(),
            posts::post_id.asc(),
            posts::proposal_type.asc(),
        )),
        (Title, Desc) => query.order((
            posts::title.desc(),
            posts::post_id.desc(),
            posts::proposal_type.desc(),
        )),
    }
}

/// Restrict to rows strictly after `cursor` using a row-value comparison.
fn after_cursor(
    statement: posts::BoxedQuery<'static, Pg>,
    query: &PostListQuery,
    cursor: &PostCursorKey,
) -> Result<posts::BoxedQuery<'static, Pg>, RepositoryError> {
    if !query.accepts_cursor(cursor) {
        return Err(RepositoryError::validation(
            "cursor does not match the requested sort column",
        ));
    }
    let column = match query.sort_by {
        PostSortBy::CreatedAt => "created_at",
        PostSortBy::UpdatedAt => "updated_at",
        PostSortBy::Title => "title",
    };
    let op = match query.order {
        SortOrder::Asc => ">",
        SortOrder::Desc => "<",
    };
    let head = sql::<Bool>(&format!("({column}, post_id, proposal_type) {op} ("));
    let post_id = to_db_int(cursor.post_id, "cursor post id")?;
    let kind = cursor.proposal_type.as_str();

    let predicate = match &cursor.sort {
        SortValue::At(at) => statement.filter(
            head.bind::<Timestamptz, _>(*at)
                .sql(", ")
                .bind::<BigInt, _>(post_id)
                .sql(", ")
                .bind::<Text, _>(kind)
                .sql(")"),
        ),
        SortValue::Title(title) => statement.filter(
            head.bind::<Text, _>(title.clone())
                .sql(", ")
                .bind::<BigInt, _>(post_id)
                .sql(", ")
                .bind::<Text, _>(kind)
                .sql(")"),
        ),
    };
    Ok(predicate)
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn find_by_key(&self, key: &PostKey) -> Result<Option<Post>, RepositoryError> {
        let pk = db_key(key)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PostRow> = posts::table
            .find(pk)
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_post).transpose()
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepositoryError> {
        let post = post.into_post(self.clock.utc());
        let (network, proposal_type, post_id) = db_key(&post.key)?;
        let row = NewPostRow {
            network,
            proposal_type,
            post_id,
            title: post.title.as_ref(),
            content: &post.content,
            proposer_address: post.proposer_address.as_ref(),
            user_id: to_db_int(post.user_id, "user id")?,
            created_at: post.created_at,
            updated_at: post.updated_at,
            tags: to_json(&post.tags, "tags")?,
            topic: post.topic.map(OffChainPostTopic::as_str),
            source: post.source.map(DataSource::as_str),
            allowed_commentors: post.allowed_commentors.map(AllowedCommentors::as_str),
            summary: post
                .summary
                .as_ref()
                .map(|summary| to_json(summary, "summary"))
                .transpose()?,
            comments_count: 0,
            reactions_count: 0,
            votes_count: 0,
            links: to_json(&post.links, "links")?,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: PostRow = diesel::insert_into(posts::table)
            .values(&row)
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_post(stored)
    }

    async fn update(&self, key: &PostKey, update: PostUpdate) -> Result<(), RepositoryError> {
        let pk = db_key(key)?;
        let changeset = PostChangeset {
            title: update.title.as_ref().map(AsRef::as_ref),
            content: update.content.as_deref(),
            tags: update
                .tags
                .as_ref()
                .map(|tags| to_json(tags, "tags"))
                .transpose()?,
            topic: update.topic.map(OffChainPostTopic::as_str),
            allowed_commentors: update.allowed_commentors.map(AllowedCommentors::as_str),
            summary: update
                .summary
                .as_ref()
                .map(|summary| to_json(summary, "summary"))
                .transpose()?,
        };
        let now = self.clock.utc();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let touched = diesel::update(posts::table.find(pk))
            .set((
                &changeset,
                posts::updated_at.eq(greatest(posts::created_at, now)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if touched == 0 {
            return Err(RepositoryError::not_found("post"));
        }
        Ok(())
    }

    async fn delete(&self, key: &PostKey) -> Result<(), RepositoryError> {
        let (network, proposal_type, post_id) = db_key(key)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = conn
            .transaction(|conn| {
                async move {
                    diesel::delete(
                        post_comments::table
                            .filter(post_comments::network.eq(network))
                            .filter(post_comments::proposal_type.eq(proposal_type))
                            .filter(post_comments::post_id.eq(post_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(
                        post_reactions::table
                            .filter(post_reactions::network.eq(network))
                            .filter(post_reactions::proposal_type.eq(proposal_type))
                            .filter(post_reactions::post_id.eq(post_id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(posts::table.find((network, proposal_type, post_id)))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        if removed == 0 {
            return Err(RepositoryError::not_found("post"));
        }
        Ok(())
    }

    async fn list(&self, query: &PostListQuery) -> Result<Vec<Post>, RepositoryError> {
        let mut statement = ordered(filtered(&query.filter)?, query.sort_by, query.order);
        match &query.start {
            PageStart::Offset(offset) => {
                statement = statement.offset(to_db_int(*offset, "offset")?);
            }
            PageStart::After(cursor) => {
                statement = after_cursor(statement, query, cursor)?;
            }
        }
        let limit = i64::try_from(query.page.limit()).unwrap_or(i64::MAX);

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PostRow> = statement
            .limit(limit)
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_post).collect()
    }

    async fn count(&self, query: &PostCountQuery) -> Result<u64, RepositoryError> {
        let statement = filtered(query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = statement
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(total).map_err(|_| RepositoryError::query("negative row count"))
    }

    async fn update_metrics(&self, key: &PostKey, delta: MetricsDelta) -> Result<(), RepositoryError> {
        let pk = db_key(key)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (comments_lo, comments_hi) = admissible(delta.comments);
        let (reactions_lo, reactions_hi) = admissible(delta.reactions);
        let (votes_lo, votes_hi) = admissible(delta.votes);
        let touched = diesel::update(
            posts::table
                .find(pk)
                .filter(posts::comments_count.between(comments_lo, comments_hi))
                .filter(posts::reactions_count.between(reactions_lo, reactions_hi))
                .filter(posts::votes_count.between(votes_lo, votes_hi)),
        )
        .set((
            posts::comments_count.eq(posts::comments_count + delta.comments),
            posts::reactions_count.eq(posts::reactions_count + delta.reactions),
            posts::votes_count.eq(posts::votes_count + delta.votes),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if touched > 0 {
            return Ok(());
        }

        let exists: Option<i64> = posts::table
            .find(pk)
            .select(posts::post_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match exists {
            Some(_) => Err(RepositoryError::validation(
                "metrics must stay within 0..=i64::MAX",
            )),
            None => Err(RepositoryError::not_found("post")),
        }
    }
}

/// Stored values a counter may hold for `current + delta` to land in
/// `0..=i64::MAX`. An empty range when no value qualifies.
fn admissible(delta: i64) -> (i64, i64) {
    if delta >= 0 {
        (0, i64::MAX - delta)
    } else {
        match delta.checked_neg() {
            Some(floor) => (floor, i64::MAX),
            None => (1, 0),
        }
    }
}
