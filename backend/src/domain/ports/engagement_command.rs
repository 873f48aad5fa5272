//! Driving port for like and bookmark toggles.

use async_trait::async_trait;

use crate::domain::{EngagementKind, Error, PostId, ToggleOutcome, UserId};

/// Domain use-case port for flipping engagement edges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngagementCommand: Send + Sync {
    /// Flip the caller's edge on `post_id`.
    async fn toggle(
        &self,
        kind: EngagementKind,
        user: &UserId,
        post_id: PostId,
    ) -> Result<ToggleOutcome, Error>;
}
