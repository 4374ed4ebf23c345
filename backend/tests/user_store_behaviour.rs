//! Behaviour of the profile stores, held to one contract across the
//! in-memory document adapter and the Diesel adapter.

use backend::domain::ports::RepositoryError;
use backend::domain::{DisplayName, Email, NewUser, UserId, UserRole, UserUpdate};
use rstest::rstest;

#[allow(dead_code, reason = "each suite uses part of the harness")]
mod support;

use support::{Adapter, Stores, epoch};

fn new_user(id: &str, email: &str) -> NewUser {
    let email = Email::new(email).expect("email");
    NewUser::with_defaults(
        UserId::new(id).expect("user id"),
        email.clone(),
        DisplayName::derive_from_email(&email),
    )
}

#[rstest]
fn created_profile_reads_back(#[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let users = stores.users.clone();
    let id = UserId::new("uid-1").expect("user id");

    let (created, found) = stores.run(async {
        let created = users
            .create(new_user("uid-1", "ada@example.com"))
            .await
            .expect("create");
        let found = users.find_by_id(&id).await.expect("find").expect("present");
        (created, found)
    });

    assert_eq!(found, created);
    assert_eq!(found.display_name().as_ref(), "ada");
    assert_eq!(found.role(), UserRole::User);
    assert_eq!(found.points_balance(), 0);
    assert_eq!(found.created_at(), epoch());
    assert_eq!(found.updated_at(), found.created_at());
}

#[rstest]
fn empty_email_is_storable(#[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let users = stores.users.clone();
    let id = UserId::new("uid-2").expect("user id");
    let profile = NewUser::with_defaults(
        id.clone(),
        Email::default(),
        DisplayName::new("").expect("empty name"),
    );

    let found = stores.run(async {
        users.create(profile).await.expect("create");
        users.find_by_id(&id).await.expect("find").expect("present")
    });
    assert!(found.email().is_empty());
}

#[rstest]
fn absent_profile_is_none(#[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let users = stores.users.clone();
    let id = UserId::new("nobody").expect("user id");
    let found = stores.run(async { users.find_by_id(&id).await.expect("find") });
    assert_eq!(found, None);
}

#[rstest]
fn duplicate_ids_conflict(#[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let users = stores.users.clone();
    let (err, kept) = stores.run(async {
        users
            .create(new_user("uid-3", "first@example.com"))
            .await
            .expect("create");
        let err = users
            .create(new_user("uid-3", "second@example.com"))
            .await
            .expect_err("duplicate");
        let kept = users
            .find_by_id(&UserId::new("uid-3").expect("user id"))
            .await
            .expect("find")
            .expect("present");
        (err, kept)
    });

    assert!(matches!(err, RepositoryError::Conflict { .. }), "{err:?}");
    assert_eq!(kept.email().as_ref(), "first@example.com");
}

#[rstest]
fn updating_an_absent_profile_creates_nothing(
    #[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter,
) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let users = stores.users.clone();
    let id = UserId::new("ghost").expect("user id");
    let update = UserUpdate {
        points_balance: Some(5),
        ..UserUpdate::default()
    };

    stores.run(async {
        let err = users.update(&id, update).await.expect_err("absent");
        assert!(matches!(err, RepositoryError::NotFound { .. }), "{err:?}");
        assert_eq!(users.find_by_id(&id).await.expect("find"), None);
    });
}

#[rstest]
fn updates_merge_fields_and_advance_updated_at(
    #[values(Adapter::Memory, Adapter::Postgres)] adapter: Adapter,
) {
    let Some(stores) = Stores::start(adapter) else {
        return;
    };
    let users = stores.users.clone();
    let id = UserId::new("uid-4").expect("user id");

    let (created, updated) = stores.run(async {
        let created = users
            .create(new_user("uid-4", "grace@example.com"))
            .await
            .expect("create");
        stores.clock.advance_seconds(45);
        let update = UserUpdate {
            role: Some(UserRole::Admin),
            points_balance: Some(120),
            ..UserUpdate::default()
        };
        users.update(&id, update).await.expect("update");
        let updated = users.find_by_id(&id).await.expect("find").expect("present");
        (created, updated)
    });

    assert_eq!(updated.email(), created.email());
    assert_eq!(updated.display_name(), created.display_name());
    assert_eq!(updated.role(), UserRole::Admin);
    assert_eq!(updated.points_balance(), 120);
    assert_eq!(updated.created_at(), created.created_at());
    assert_eq!(
        updated.updated_at(),
        created.created_at() + chrono::TimeDelta::seconds(45)
    );
}
