//! Port for the post graph store.
//!
//! The store answers structural questions only. Authorisation, enrichment,
//! and repost-depth policy live in the services above it.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::{Post, PostDraft, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post graph adapters.
    pub enum PostRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "post repository query failed: {message}",
        /// A referenced author, parent, or repost target does not exist.
        MissingReference { message: String } => "post reference not found: {message}",
    }
}

/// Which slice of the graph a timeline listing covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineScope {
    /// Top-level posts from everyone.
    Global,
    /// Every post written by one user, replies and reposts included.
    Author(UserId),
}

/// Port for reading and writing posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a validated draft and return the stored post.
    async fn create(
        &self,
        draft: &PostDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Post, PostRepositoryError>;

    /// Fetch a single post.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// Fetch every post in `ids` that exists, in no particular order.
    async fn find_many(&self, ids: &[PostId]) -> Result<Vec<Post>, PostRepositoryError>;

    /// List a page of posts newest first.
    async fn list_timeline(
        &self,
        scope: &TimelineScope,
        page: PageRequest,
    ) -> Result<Vec<Post>, PostRepositoryError>;

    /// List a page of posts bookmarked by `user`, most recently bookmarked
    /// first.
    async fn list_bookmarked(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Vec<Post>, PostRepositoryError>;

    /// List the direct replies to `parent`, oldest first.
    async fn list_replies(&self, parent: PostId) -> Result<Vec<Post>, PostRepositoryError>;

    /// Count direct replies to `id`.
    async fn count_replies(&self, id: PostId) -> Result<i64, PostRepositoryError>;

    /// Count reposts of `id`.
    async fn count_reposts(&self, id: PostId) -> Result<i64, PostRepositoryError>;

    /// Whether `user` authored a repost of `id`.
    async fn has_reposted(&self, user: &UserId, id: PostId) -> Result<bool, PostRepositoryError>;

    /// Reply counts for a set of posts. Posts without replies may be absent.
    async fn reply_counts(
        &self,
        ids: &[PostId],
    ) -> Result<HashMap<PostId, i64>, PostRepositoryError>;

    /// Repost counts for a set of posts. Posts without reposts may be absent.
    async fn repost_counts(
        &self,
        ids: &[PostId],
    ) -> Result<HashMap<PostId, i64>, PostRepositoryError>;

    /// The subset of `ids` that `user` has reposted.
    async fn reposted_by(
        &self,
        user: &UserId,
        ids: &[PostId],
    ) -> Result<HashSet<PostId>, PostRepositoryError>;

    /// Hard-delete a post. Returns `false` when nothing was deleted.
    async fn delete(&self, id: PostId) -> Result<bool, PostRepositoryError>;
}
