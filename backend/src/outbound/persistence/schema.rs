//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Unique public handle, `[A-Za-z0-9_]{1,32}`.
        username -> Varchar,
        /// Unique, lower-cased login address.
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        bio -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Posts, replies, and reposts.
    ///
    /// `parent_id` marks a reply; `repost_id` marks a repost. Both reference
    /// `posts.id` and are nulled when the referenced post is deleted.
    posts (id) {
        id -> Int8,
        author_id -> Uuid,
        content -> Varchar,
        parent_id -> Nullable<Int8>,
        repost_id -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Like edges keyed by `(user_id, post_id)`.
    likes (user_id, post_id) {
        user_id -> Uuid,
        post_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Bookmark edges keyed by `(user_id, post_id)`.
    bookmarks (user_id, post_id) {
        user_id -> Uuid,
        post_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(posts -> users (author_id));
diesel::joinable!(likes -> posts (post_id));
diesel::joinable!(bookmarks -> posts (post_id));

diesel::allow_tables_to_appear_in_same_query!(users, posts, likes, bookmarks);
