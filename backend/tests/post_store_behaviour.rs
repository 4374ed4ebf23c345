//! Behaviour of the post stores and the listing service, held to one
//! contract across the in-memory document adapter and the Diesel adapter:
//! defaults on create, atomic increments, counter bounds, absent-key
//! writes, hard deletes and gap-free pagination.

use std::collections::HashSet;
use std::sync::Arc;

use backend::domain::ports::{PostsQuery, RepositoryError};
use backend::domain::{
    AllowedCommentors, DataSource, MetricsDelta, Network, NewPost, PageStart, PostKey,
    PostListQuery, PostMetrics, PostService, PostSortBy, PostTitle, PostUpdate, ProposalType,
    ProposerAddress, SortOrder,
};
use diesel::RunQueryDsl;
use diesel::dsl::sql;
use diesel::sql_types::BigInt;
use futures::future::join_all;
use pagination::PageParams;
use rstest::rstest;

#[allow(dead_code, reason = "each suite uses part of the harness")]
mod support;

use support::{Adapter, Stores, epoch};

fn new_post(kind: ProposalType, id: u64, title: &str) -> NewPost {
    NewPost {
        key: PostKey::new(Network::Polkadot, kind, id),
        title: PostTitle::new(title).expect("title"),
        content: format!("body of {title}"),
        proposer_address: ProposerAddress::new("5F3sa2TJAWMqDhXG6jhV4N8ko9SxwGy8TpaNS1repo5EYjQX")
            .expect("address"),
        user_id: id,
        tags: Vec::new(),
        topic: None,
    }
}

#[rstest]
fn created_post_reads_back_with_server_defaults(
    #[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter,
) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let repo = stores.posts.clone();
    let key = PostKey::new(Network::Polkadot, ProposalType::ReferendumsV2, 123);

    let (created, found) = stores.run(async {
        let created = repo
            .create(new_post(ProposalType::ReferendumsV2, 123, "T"))
            .await
            .expect("create");
        let found = repo.find_by_key(&key).await.expect("find").expect("present");
        (created, found)
    });

    assert_eq!(found, created);
    assert_eq!(found.metrics, PostMetrics::default());
    assert_eq!(found.created_at, epoch());
    assert_eq!(found.updated_at, found.created_at);
    assert_eq!(found.source, Some(DataSource::Polkassembly));
    assert_eq!(found.allowed_commentors, Some(AllowedCommentors::All));
    assert!(found.links.is_empty());
}

#[rstest]
fn duplicate_keys_conflict(#[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let repo = stores.posts.clone();

    let err = stores.run(async {
        repo.create(new_post(ProposalType::Tips, 8, "first"))
            .await
            .expect("create");
        repo.create(new_post(ProposalType::Tips, 8, "second"))
            .await
            .expect_err("duplicate")
    });
    assert!(matches!(err, RepositoryError::Conflict { .. }));
}

#[rstest]
fn concurrent_increments_are_not_lost(
    #[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter,
) {
    const WRITERS: u64 = 64;
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let repo = stores.posts.clone();
    let key = PostKey::new(Network::Polkadot, ProposalType::Discussions, 7);

    let metrics = stores.run(async {
        repo.create(new_post(ProposalType::Discussions, 7, "busy"))
            .await
            .expect("create");
        let writers = (0..WRITERS).map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                let delta = MetricsDelta {
                    comments: 1,
                    reactions: i64::from(i % 2 == 0),
                    votes: 2,
                };
                repo.update_metrics(&key, delta).await
            })
        });
        for outcome in join_all(writers).await {
            outcome.expect("task joined").expect("increment applied");
        }
        repo.find_by_key(&key)
            .await
            .expect("find")
            .expect("present")
            .metrics
    });

    assert_eq!(
        metrics,
        PostMetrics {
            comments: WRITERS,
            reactions: WRITERS / 2,
            votes: WRITERS * 2,
        }
    );
}

#[rstest]
#[case::below_zero(MetricsDelta { comments: 1, reactions: -1, votes: 0 })]
#[case::past_storage_range(MetricsDelta { comments: 1, reactions: 0, votes: 1 })]
fn out_of_range_deltas_are_rejected_whole(
    #[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter,
    #[case] delta: MetricsDelta,
) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let repo = stores.posts.clone();
    let key = PostKey::new(Network::Polkadot, ProposalType::Bounties, 3);
    let saturated = MetricsDelta {
        votes: i64::MAX,
        ..MetricsDelta::default()
    };

    let (err, metrics) = stores.run(async {
        repo.create(new_post(ProposalType::Bounties, 3, "bounded"))
            .await
            .expect("create");
        repo.update_metrics(&key, saturated)
            .await
            .expect("largest storable count");
        let err = repo
            .update_metrics(&key, delta)
            .await
            .expect_err("out of range");
        let metrics = repo
            .find_by_key(&key)
            .await
            .expect("find")
            .expect("present")
            .metrics;
        (err, metrics)
    });

    assert!(matches!(err, RepositoryError::Validation { .. }), "{err:?}");
    assert_eq!(
        metrics,
        PostMetrics {
            comments: 0,
            reactions: 0,
            votes: i64::MAX.unsigned_abs(),
        }
    );
}

#[rstest]
fn writes_to_an_absent_key_fail_without_creating_it(
    #[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter,
) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let repo = stores.posts.clone();
    let key = PostKey::new(Network::Polkadot, ProposalType::Tips, 404);
    let update = PostUpdate {
        content: Some("edited".to_owned()),
        ..PostUpdate::default()
    };

    stores.run(async {
        let err = repo.update(&key, update).await.expect_err("absent");
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        let err = repo
            .update_metrics(&key, MetricsDelta { votes: 1, ..MetricsDelta::default() })
            .await
            .expect_err("absent");
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        let err = repo.delete(&key).await.expect_err("absent");
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(repo.find_by_key(&key).await.expect("find"), None);
    });
}

#[rstest]
fn updates_merge_fields_and_advance_updated_at(
    #[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter,
) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let repo = stores.posts.clone();
    let key = PostKey::new(Network::Polkadot, ProposalType::Grants, 12);

    let (created, updated) = stores.run(async {
        let created = repo
            .create(new_post(ProposalType::Grants, 12, "draft"))
            .await
            .expect("create");
        stores.clock.advance_seconds(90);
        let update = PostUpdate {
            title: Some(PostTitle::new("final").expect("title")),
            ..PostUpdate::default()
        };
        repo.update(&key, update).await.expect("update");
        let updated = repo.find_by_key(&key).await.expect("find").expect("present");
        (created, updated)
    });

    assert_eq!(updated.title.as_ref(), "final");
    assert_eq!(updated.content, created.content);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(
        updated.updated_at,
        created.created_at + chrono::TimeDelta::seconds(90)
    );
}

#[rstest]
fn delete_is_hard_and_removes_children() {
    let Some(stores) = Stores::start(Adapter::Postgres) else {
        return;
    };
    let repo = stores.posts.clone();
    let key = PostKey::new(Network::Polkadot, ProposalType::ReferendumsV2, 55);
    stores.run(async {
        repo.create(new_post(ProposalType::ReferendumsV2, 55, "doomed"))
            .await
            .expect("create");
    });

    let mut conn = stores.direct_connection().expect("postgres connection");
    diesel::sql_query(
        "INSERT INTO post_comments (network, proposal_type, post_id, user_id, content, created_at) \
         VALUES ('polkadot', 'referendums_v2', 55, 1, 'first', now())",
    )
    .execute(&mut conn)
    .expect("seed comment");
    diesel::sql_query(
        "INSERT INTO post_reactions (network, proposal_type, post_id, user_id, reaction, created_at) \
         VALUES ('polkadot', 'referendums_v2', 55, 2, 'like', now())",
    )
    .execute(&mut conn)
    .expect("seed reaction");

    stores.run(async {
        repo.delete(&key).await.expect("delete");
        assert_eq!(repo.find_by_key(&key).await.expect("find"), None);
    });

    let children: i64 = diesel::select(sql::<BigInt>(
        "(SELECT count(*) FROM post_comments) + (SELECT count(*) FROM post_reactions)",
    ))
    .get_result(&mut conn)
    .expect("count children");
    assert_eq!(children, 0);
}

/// Seed 23 posts; several share a timestamp and three ids recur across
/// proposal types, so ordering relies on the tie-breakers.
async fn seed(stores: &Stores) {
    for id in 0..20_u64 {
        if id % 3 != 0 {
            stores.clock.advance_seconds(30);
        }
        stores
            .posts
            .create(new_post(ProposalType::ReferendumsV2, id, &format!("post {:02}", 19 - id)))
            .await
            .expect("seed");
    }
    for id in [4_u64, 5, 6] {
        stores
            .posts
            .create(new_post(ProposalType::Discussions, id, "post 05"))
            .await
            .expect("seed");
    }
}

fn query(sort_by: PostSortBy, order: SortOrder, limit: usize) -> PostListQuery {
    let mut query = PostListQuery::new(Network::Polkadot);
    query.sort_by = sort_by;
    query.order = order;
    query.page = PageParams::new(Some(limit)).expect("limit");
    query
}

#[rstest]
#[case(PostSortBy::CreatedAt, SortOrder::Desc, 7)]
#[case(PostSortBy::CreatedAt, SortOrder::Asc, 5)]
#[case(PostSortBy::Title, SortOrder::Asc, 4)]
#[case(PostSortBy::Title, SortOrder::Desc, 6)]
#[case(PostSortBy::UpdatedAt, SortOrder::Desc, 23)]
fn offset_and_cursor_pages_partition_the_listing(
    #[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter,
    #[case] sort_by: PostSortBy,
    #[case] order: SortOrder,
    #[case] limit: usize,
) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    stores.run(async {
        seed(&stores).await;
        let service = PostService::new(stores.posts.clone(), None);

        let full: Vec<PostKey> = service
            .list_posts(&query(sort_by, order, 100))
            .await
            .expect("full listing")
            .posts
            .iter()
            .map(|post| post.key)
            .collect();
        assert_eq!(full.len(), 23);

        let mut by_offset = Vec::new();
        let mut offset = 0_u64;
        loop {
            let mut page_query = query(sort_by, order, limit);
            page_query.start = PageStart::Offset(offset);
            let page = service.list_posts(&page_query).await.expect("offset page");
            assert_eq!(page.total_count, 23);
            if page.posts.is_empty() {
                break;
            }
            offset += u64::try_from(page.posts.len()).expect("page length");
            by_offset.extend(page.posts.iter().map(|post| post.key));
        }
        assert_eq!(by_offset, full);

        let mut by_cursor = Vec::new();
        let mut page_query = query(sort_by, order, limit);
        loop {
            let page = service.list_posts(&page_query).await.expect("cursor page");
            by_cursor.extend(page.posts.iter().map(|post| post.key));
            match page.next {
                Some(next) => page_query.start = PageStart::After(next),
                None => break,
            }
        }
        assert_eq!(by_cursor, full);
        let distinct: HashSet<PostKey> = by_cursor.iter().copied().collect();
        assert_eq!(distinct.len(), full.len());
    });
}

#[rstest]
fn title_order_is_bytewise(#[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let titles = stores.run(async {
        for (id, title) in [(1_u64, "beta"), (2, "Zulu"), (3, "alpha"), (4, "Alpha")] {
            stores
                .posts
                .create(new_post(ProposalType::Discussions, id, title))
                .await
                .expect("seed");
        }
        stores
            .posts
            .list(&query(PostSortBy::Title, SortOrder::Asc, 10))
            .await
            .expect("listing")
            .into_iter()
            .map(|post| post.title.as_ref().to_owned())
            .collect::<Vec<_>>()
    });
    assert_eq!(titles, ["Alpha", "Zulu", "alpha", "beta"]);
}

#[rstest]
fn filters_narrow_both_rows_and_total(
    #[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter,
) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    stores.run(async {
        seed(&stores).await;
        let service = PostService::new(stores.posts.clone(), None);
        let mut filtered = query(PostSortBy::CreatedAt, SortOrder::Desc, 2);
        filtered.filter.proposal_type = Some(ProposalType::Discussions);

        let page = service.list_posts(&filtered).await.expect("page");
        assert_eq!(page.total_count, 3);
        assert_eq!(page.posts.len(), 2);
        assert!(page.next.is_some());
        assert!(
            page.posts
                .iter()
                .all(|post| post.key.proposal_type == ProposalType::Discussions)
        );
    });
}
