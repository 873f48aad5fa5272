//! Driving port for the four enriched read paths.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, PostId, PostView, Thread, Timeline, UserId};

use super::TimelineScope;

/// Domain use-case port for reading posts as a viewer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimelineQuery: Send + Sync {
    /// Global or profile timeline, newest first.
    async fn timeline(
        &self,
        viewer: &UserId,
        scope: &TimelineScope,
        page: PageRequest,
    ) -> Result<Timeline, Error>;

    /// The viewer's bookmarks, most recently bookmarked first.
    async fn bookmarks(&self, viewer: &UserId, page: PageRequest) -> Result<Timeline, Error>;

    /// A single post with engagement fields.
    async fn post_detail(&self, viewer: &UserId, post_id: PostId) -> Result<PostView, Error>;

    /// A post and its direct replies, oldest reply first.
    async fn thread(&self, viewer: &UserId, post_id: PostId) -> Result<Thread, Error>;
}
