//! Write-side service for posts, replies, and reposts.
//!
//! Reposts resolve exactly one level: a repost may only point at an ordinary
//! post or reply, never at another repost.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    CreatePostRequest, EngagementRepository, PostCommand, PostRepository, UserRepository,
};
use crate::domain::store_errors::map_post_error;
use crate::domain::{
    Error, Post, PostDraft, PostId, PostValidationError, PostView, TimelineAssembler, UserId,
};

/// Implements [`PostCommand`] on top of the post graph store.
pub struct PostService<P, E, U> {
    posts: Arc<P>,
    assembler: TimelineAssembler<P, E, U>,
    clock: Arc<dyn Clock>,
}

impl<P, E, U> Clone for PostService<P, E, U> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            assembler: self.assembler.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, E, U> PostService<P, E, U>
where
    P: PostRepository,
    E: EngagementRepository,
    U: UserRepository,
{
    pub fn new(posts: Arc<P>, engagement: Arc<E>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        let assembler = TimelineAssembler::new(Arc::clone(&posts), engagement, users);
        Self {
            posts,
            assembler,
            clock,
        }
    }

    async fn load(&self, id: PostId) -> Result<Option<Post>, Error> {
        self.posts.find_by_id(id).await.map_err(map_post_error)
    }

    async fn check_references(&self, draft: &PostDraft) -> Result<(), Error> {
        if let Some(parent_id) = draft.parent_id() {
            if self.load(parent_id).await?.is_none() {
                return Err(Error::not_found(format!("parent post {parent_id} not found")));
            }
        }

        if let Some(target_id) = draft.repost_id() {
            let target = self
                .load(target_id)
                .await?
                .ok_or_else(|| Error::not_found(format!("repost target {target_id} not found")))?;
            if target.is_repost() {
                return Err(Error::invalid_request("cannot repost a repost").with_details(
                    json!({ "field": "repost_id", "code": "repost_of_repost" }),
                ));
            }
        }
        Ok(())
    }
}

fn map_validation_error(error: PostValidationError) -> Error {
    let code = match error {
        PostValidationError::EmptyContent => "empty_content",
        PostValidationError::ContentTooLong { .. } => "content_too_long",
    };
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": "content", "code": code }))
}

#[async_trait]
impl<P, E, U> PostCommand for PostService<P, E, U>
where
    P: PostRepository,
    E: EngagementRepository,
    U: UserRepository,
{
    async fn create_post(&self, request: CreatePostRequest) -> Result<PostView, Error> {
        let CreatePostRequest {
            author,
            content,
            parent_id,
            repost_id,
        } = request;
        let draft = PostDraft::new(author.clone(), content, parent_id, repost_id)
            .map_err(map_validation_error)?;
        self.check_references(&draft).await?;

        let post = self
            .posts
            .create(&draft, self.clock.utc())
            .await
            .map_err(map_post_error)?;
        info!(
            post_id = %post.id,
            author_id = %author,
            reply = post.parent_id.is_some(),
            repost = post.is_repost(),
            "post created"
        );

        self.assembler
            .assemble_one(&author, post)
            .await?
            .ok_or_else(|| Error::internal("author vanished while creating post"))
    }

    async fn delete_post(&self, actor: &UserId, post_id: PostId) -> Result<(), Error> {
        let post = self
            .load(post_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("post {post_id} not found")))?;
        if &post.author_id != actor {
            return Err(Error::forbidden("only the author may delete this post"));
        }

        let deleted = self.posts.delete(post_id).await.map_err(map_post_error)?;
        if !deleted {
            return Err(Error::not_found(format!("post {post_id} not found")));
        }
        info!(post_id = %post_id, author_id = %actor, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
