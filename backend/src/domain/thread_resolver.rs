//! Resolve a post together with its direct replies.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{EngagementRepository, PostRepository, UserRepository};
use crate::domain::store_errors::map_post_error;
use crate::domain::{Error, PostId, Thread, TimelineAssembler, UserId};

/// Builds [`Thread`] read models.
///
/// The root and every reply go through a single
/// [`TimelineAssembler::assemble`] call, so a thread costs the same number of
/// store round-trips as a timeline page.
pub struct ThreadResolver<P, E, U> {
    posts: Arc<P>,
    assembler: TimelineAssembler<P, E, U>,
}

impl<P, E, U> Clone for ThreadResolver<P, E, U> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            assembler: self.assembler.clone(),
        }
    }
}

impl<P, E, U> ThreadResolver<P, E, U>
where
    P: PostRepository,
    E: EngagementRepository,
    U: UserRepository,
{
    pub fn new(posts: Arc<P>, assembler: TimelineAssembler<P, E, U>) -> Self {
        Self { posts, assembler }
    }

    /// Load `post_id` and its direct replies, oldest reply first.
    ///
    /// Replies of replies are not expanded; clients walk down by resolving a
    /// reply as the next root.
    pub async fn resolve(&self, viewer: &UserId, post_id: PostId) -> Result<Thread, Error> {
        let root = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| not_found(post_id))?;
        let replies = self
            .posts
            .list_replies(post_id)
            .await
            .map_err(map_post_error)?;

        let mut batch = Vec::with_capacity(replies.len() + 1);
        batch.push(root);
        batch.extend(replies);

        let mut views = self.assembler.assemble(viewer, batch).await?.posts;
        match views.first() {
            Some(first) if first.post.id == post_id => {}
            _ => return Err(not_found(post_id)),
        }
        let root = views.remove(0);

        debug!(post_id = %post_id, replies = views.len(), "thread resolved");
        Ok(Thread {
            root,
            replies: views,
        })
    }
}

fn not_found(post_id: PostId) -> Error {
    Error::not_found(format!("post {post_id} not found"))
}
