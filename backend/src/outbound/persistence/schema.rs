//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. `diesel
//! print-schema` regenerates them from a migrated database.

diesel::table! {
    /// User profiles keyed by the identity provider's uid.
    users (id) {
        id -> Varchar,
        /// Empty string when the provider supplied no address.
        email -> Varchar,
        display_name -> Varchar,
        /// `user` or `admin`.
        role -> Varchar,
        /// Checked non-negative by the schema.
        points_balance -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Governance posts keyed by network, proposal type, and post id.
    posts (network, proposal_type, post_id) {
        network -> Varchar,
        /// Compared with the "C" collation so listing order is bytewise.
        proposal_type -> Varchar,
        post_id -> Int8,
        title -> Varchar,
        content -> Text,
        proposer_address -> Varchar,
        user_id -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
        /// JSON array of `{ value, lastUsedAt? }`.
        tags -> Jsonb,
        topic -> Nullable<Varchar>,
        source -> Nullable<Varchar>,
        allowed_commentors -> Nullable<Varchar>,
        /// JSON `{ summary, createdAt }`.
        summary -> Nullable<Jsonb>,
        comments_count -> Int8,
        reactions_count -> Int8,
        votes_count -> Int8,
        /// JSON array of `{ proposalType, postId }`.
        links -> Jsonb,
    }
}

diesel::table! {
    /// Comments attached to a post; removed with their post.
    post_comments (id) {
        id -> Int8,
        network -> Varchar,
        proposal_type -> Varchar,
        post_id -> Int8,
        user_id -> Int8,
        content -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reactions attached to a post; removed with their post.
    post_reactions (id) {
        id -> Int8,
        network -> Varchar,
        proposal_type -> Varchar,
        post_id -> Int8,
        user_id -> Int8,
        reaction -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::define_sql_function! {
    /// PostgreSQL `GREATEST` over two timestamps; keeps `updated_at` from
    /// falling behind `created_at` under clock skew.
    fn greatest(a: diesel::sql_types::Timestamptz, b: diesel::sql_types::Timestamptz) -> diesel::sql_types::Timestamptz;
}
