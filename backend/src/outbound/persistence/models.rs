//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live here so
//! every repository validates stored rows the same way.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{Email, Post, PostId, User, UserDraft, UserId, Username};

use super::schema::{posts, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User row joined with its credential hash, used only by login.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialRow {
    #[diesel(embed)]
    pub user: UserRow,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub bio: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username)
            .map_err(|err| format!("stored username for {} is invalid: {err}", row.id))?;
        let email = Email::new(row.email)
            .map_err(|err| format!("stored email for {} is invalid: {err}", row.id))?;
        Ok(User::new(UserDraft {
            id: UserId::from_uuid(row.id),
            username,
            email,
            bio: row.bio,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

/// Row struct for reading from the posts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: i64,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<i64>,
    pub repost_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new posts. The id is assigned by the
/// `bigserial` sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub author_id: Uuid,
    pub content: &'a str,
    pub parent_id: Option<i64>,
    pub repost_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: PostId::new(row.id),
            author_id: UserId::from_uuid(row.author_id),
            content: row.content,
            parent_id: row.parent_id.map(PostId::new),
            repost_id: row.repost_id.map(PostId::new),
            created_at: row.created_at,
        }
    }
}

pub(crate) fn raw_post_ids(ids: &[PostId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

pub(crate) fn raw_user_ids(ids: &[UserId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}
