//! PostgreSQL-backed [`UserRepository`].

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{
    DisplayName, Email, NewUser, User, UserId, UserParts, UserRole, UserUpdate,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::{greatest, users};

/// Diesel implementation of the user profile store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselUserRepository {
    /// Repository over `pool`, stamping times with the system clock.
    pub fn new(pool: DbPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }

    /// Use `clock` to stamp `created_at` and `updated_at`.
    pub fn with_clock(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn points_to_db(points: u64) -> Result<i64, RepositoryError> {
    i64::try_from(points)
        .map_err(|_| RepositoryError::validation("points balance exceeds storage range"))
}

fn row_to_user(row: UserRow) -> Result<User, RepositoryError> {
    let corrupt = |detail: String| {
        RepositoryError::query(format!("stored user {} is invalid: {detail}", row.id))
    };
    let parts = UserParts {
        id: UserId::new(row.id.clone()).map_err(|err| corrupt(err.to_string()))?,
        email: Email::new(row.email.clone()).map_err(|err| corrupt(err.to_string()))?,
        display_name: DisplayName::new(row.display_name.clone())
            .map_err(|err| corrupt(err.to_string()))?,
        role: row
            .role
            .parse::<UserRole>()
            .map_err(|err| corrupt(err.to_string()))?,
        points_balance: u64::try_from(row.points_balance)
            .map_err(|_| corrupt("negative points balance".to_owned()))?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    User::try_from_parts(parts).map_err(|err| corrupt(err.to_string()))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_ref())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let now = self.clock.utc();
        let row = NewUserRow {
            id: user.id.as_ref(),
            email: user.email.as_ref(),
            display_name: user.display_name.as_ref(),
            role: user.role.as_str(),
            points_balance: points_to_db(user.points_balance)?,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_user(stored)
    }

    async fn update(&self, id: &UserId, update: UserUpdate) -> Result<(), RepositoryError> {
        let points_balance = update.points_balance.map(points_to_db).transpose()?;
        let changeset = UserChangeset {
            email: update.email.as_ref().map(AsRef::as_ref),
            display_name: update.display_name.as_ref().map(AsRef::as_ref),
            role: update.role.map(UserRole::as_str),
            points_balance,
        };
        let now = self.clock.utc();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let touched = diesel::update(users::table.find(id.as_ref()))
            .set((
                &changeset,
                users::updated_at.eq(greatest(users::created_at, now)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if touched == 0 {
            return Err(RepositoryError::not_found("user"));
        }
        Ok(())
    }
}
