//! Port for the engagement ledger.
//!
//! Implementations must make [`EngagementRepository::toggle`] atomic per
//! `(kind, user, post)`: two concurrent toggles must observe each other's
//! effect, never the same prior state.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EngagementKind, PostId, ToggleOutcome, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by engagement ledger adapters.
    pub enum EngagementRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "engagement repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "engagement repository query failed: {message}",
        /// The post vanished before the edge could be written.
        MissingPost { post_id: i64 } => "post {post_id} does not exist",
    }
}

/// Port for like and bookmark edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Whether the edge exists.
    async fn exists(
        &self,
        kind: EngagementKind,
        user: &UserId,
        post: PostId,
    ) -> Result<bool, EngagementRepositoryError>;

    /// Atomically flip the edge and report the new state and count.
    async fn toggle(
        &self,
        kind: EngagementKind,
        user: &UserId,
        post: PostId,
        at: DateTime<Utc>,
    ) -> Result<ToggleOutcome, EngagementRepositoryError>;

    /// Number of edges on `post`.
    async fn count(&self, kind: EngagementKind, post: PostId)
    -> Result<i64, EngagementRepositoryError>;

    /// Edge counts for a set of posts. Posts without edges may be absent.
    async fn counts(
        &self,
        kind: EngagementKind,
        ids: &[PostId],
    ) -> Result<HashMap<PostId, i64>, EngagementRepositoryError>;

    /// The subset of `ids` on which `user` holds an edge.
    async fn active_for(
        &self,
        kind: EngagementKind,
        user: &UserId,
        ids: &[PostId],
    ) -> Result<HashSet<PostId>, EngagementRepositoryError>;
}
