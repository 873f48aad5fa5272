//! Read-side view models produced by enrichment.
//!
//! Every field here is derived per request for one viewer and is never
//! persisted or cached.

use super::post::Post;
use super::user::User;

/// Engagement figures attached to a post for one viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostStats {
    pub like_count: i64,
    pub is_liked: bool,
    pub bookmark_count: i64,
    pub is_bookmarked: bool,
    pub reply_count: i64,
    pub repost_count: i64,
    pub is_reposted: bool,
}

/// A repost target embedded inside a [`PostView`].
///
/// The type has no repost slot of its own, so resolution stops after one
/// level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedPost {
    pub post: Post,
    pub author: User,
    pub stats: PostStats,
}

/// A post ready to be rendered for a viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post: Post,
    pub author: User,
    pub stats: PostStats,
    /// Present when the post is a repost and its target still exists.
    pub repost: Option<EmbeddedPost>,
}

/// An enriched page of posts in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    pub posts: Vec<PostView>,
}

/// A root post followed by its direct replies, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub root: PostView,
    pub replies: Vec<PostView>,
}
