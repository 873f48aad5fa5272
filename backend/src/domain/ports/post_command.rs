//! Driving port for post mutations.

use async_trait::async_trait;

use crate::domain::{Error, PostId, PostView, UserId};

/// Raw create request; content rules are checked by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostRequest {
    pub author: UserId,
    pub content: String,
    pub parent_id: Option<PostId>,
    pub repost_id: Option<PostId>,
}

/// Domain use-case port for writing posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Create a post and return it enriched for its author.
    async fn create_post(&self, request: CreatePostRequest) -> Result<PostView, Error>;

    /// Delete a post. Only its author may do so.
    async fn delete_post(&self, actor: &UserId, post_id: PostId) -> Result<(), Error>;
}
