//! Post graph model.
//!
//! Posts form a self-referential graph through two optional back references:
//! `parent_id` marks a reply and `repost_id` marks a repost. Both are stored
//! as plain ids and resolved by explicit lookups; no post ever owns another.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Maximum post length in Unicode scalar values.
pub const POST_CONTENT_MAX: usize = 140;

/// Numeric post identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

/// Validation errors raised while building a [`PostDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    /// Content was empty and the post is not a repost.
    EmptyContent,
    /// Content exceeded [`POST_CONTENT_MAX`] scalar values.
    ContentTooLong { max: usize, actual: usize },
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "content must not be empty unless reposting"),
            Self::ContentTooLong { max, actual } => {
                write!(f, "content must be at most {max} characters (got {actual})")
            }
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Post as stored in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub content: String,
    pub parent_id: Option<PostId>,
    pub repost_id: Option<PostId>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// True when this post wraps another post.
    pub fn is_repost(&self) -> bool {
        self.repost_id.is_some()
    }
}

/// Validated input for creating a post.
///
/// ## Invariants
/// - `content` holds at most [`POST_CONTENT_MAX`] scalar values.
/// - `content` is non-empty unless `repost_id` is set.
///
/// # Examples
/// ```
/// use chirp_backend::domain::{PostDraft, PostId, UserId};
///
/// let author = UserId::random();
/// let repost = PostDraft::new(author, "", None, Some(PostId::new(7))).unwrap();
/// assert!(repost.content().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    author_id: UserId,
    content: String,
    parent_id: Option<PostId>,
    repost_id: Option<PostId>,
}

impl PostDraft {
    /// Validate the content rules for a new post.
    pub fn new(
        author_id: UserId,
        content: impl Into<String>,
        parent_id: Option<PostId>,
        repost_id: Option<PostId>,
    ) -> Result<Self, PostValidationError> {
        let content = content.into();
        if content.is_empty() && repost_id.is_none() {
            return Err(PostValidationError::EmptyContent);
        }
        let length = content.chars().count();
        if length > POST_CONTENT_MAX {
            return Err(PostValidationError::ContentTooLong {
                max: POST_CONTENT_MAX,
                actual: length,
            });
        }
        Ok(Self {
            author_id,
            content,
            parent_id,
            repost_id,
        })
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    pub fn parent_id(&self) -> Option<PostId> {
        self.parent_id
    }

    pub fn repost_id(&self) -> Option<PostId> {
        self.repost_id
    }
}
