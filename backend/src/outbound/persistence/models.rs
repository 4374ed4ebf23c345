//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{posts, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub points_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
    pub points_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial user update; `None` columns are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub email: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub role: Option<&'a str>,
    pub points_balance: Option<i64>,
}

/// Row struct for reading from the posts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub network: String,
    pub proposal_type: String,
    pub post_id: i64,
    pub title: String,
    pub content: String,
    pub proposer_address: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: serde_json::Value,
    pub topic: Option<String>,
    pub source: Option<String>,
    pub allowed_commentors: Option<String>,
    pub summary: Option<serde_json::Value>,
    pub comments_count: i64,
    pub reactions_count: i64,
    pub votes_count: i64,
    pub links: serde_json::Value,
}

/// Insertable struct for creating post records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub network: &'a str,
    pub proposal_type: &'a str,
    pub post_id: i64,
    pub title: &'a str,
    pub content: &'a str,
    pub proposer_address: &'a str,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: serde_json::Value,
    pub topic: Option<&'a str>,
    pub source: Option<&'a str>,
    pub allowed_commentors: Option<&'a str>,
    pub summary: Option<serde_json::Value>,
    pub comments_count: i64,
    pub reactions_count: i64,
    pub votes_count: i64,
    pub links: serde_json::Value,
}

/// Partial post update; `None` columns are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = posts)]
pub(crate) struct PostChangeset<'a> {
    pub title: Option<&'a str>,
    pub content: Option<&'a str>,
    pub tags: Option<serde_json::Value>,
    pub topic: Option<&'a str>,
    pub allowed_commentors: Option<&'a str>,
    pub summary: Option<serde_json::Value>,
}
