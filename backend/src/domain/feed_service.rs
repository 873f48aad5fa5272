//! Read-side service implementing [`TimelineQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::ports::{
    EngagementRepository, PostRepository, TimelineQuery, TimelineScope, UserRepository,
};
use crate::domain::store_errors::map_post_error;
use crate::domain::{
    Error, PostId, PostView, Thread, ThreadResolver, Timeline, TimelineAssembler, UserId,
};

/// Lists posts from the graph store and enriches them for the viewer.
pub struct FeedService<P, E, U> {
    posts: Arc<P>,
    assembler: TimelineAssembler<P, E, U>,
    threads: ThreadResolver<P, E, U>,
}

impl<P, E, U> Clone for FeedService<P, E, U> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            assembler: self.assembler.clone(),
            threads: self.threads.clone(),
        }
    }
}

impl<P, E, U> FeedService<P, E, U>
where
    P: PostRepository,
    E: EngagementRepository,
    U: UserRepository,
{
    /// Wire the service over shared stores.
    ///
    /// # Examples
    /// ```ignore
    /// let feed = FeedService::new(posts, engagement, users);
    /// let page = feed.timeline(&viewer, &TimelineScope::Global, PageRequest::default()).await?;
    /// ```
    pub fn new(posts: Arc<P>, engagement: Arc<E>, users: Arc<U>) -> Self {
        let assembler = TimelineAssembler::new(Arc::clone(&posts), engagement, users);
        let threads = ThreadResolver::new(Arc::clone(&posts), assembler.clone());
        Self {
            posts,
            assembler,
            threads,
        }
    }
}

#[async_trait]
impl<P, E, U> TimelineQuery for FeedService<P, E, U>
where
    P: PostRepository,
    E: EngagementRepository,
    U: UserRepository,
{
    async fn timeline(
        &self,
        viewer: &UserId,
        scope: &TimelineScope,
        page: PageRequest,
    ) -> Result<Timeline, Error> {
        let posts = self
            .posts
            .list_timeline(scope, page)
            .await
            .map_err(map_post_error)?;
        self.assembler.assemble(viewer, posts).await
    }

    async fn bookmarks(&self, viewer: &UserId, page: PageRequest) -> Result<Timeline, Error> {
        let posts = self
            .posts
            .list_bookmarked(viewer, page)
            .await
            .map_err(map_post_error)?;
        self.assembler.assemble(viewer, posts).await
    }

    async fn post_detail(&self, viewer: &UserId, post_id: PostId) -> Result<PostView, Error> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| Error::not_found(format!("post {post_id} not found")))?;
        self.assembler
            .assemble_one(viewer, post)
            .await?
            .ok_or_else(|| Error::not_found(format!("post {post_id} not found")))
    }

    async fn thread(&self, viewer: &UserId, post_id: PostId) -> Result<Thread, Error> {
        self.threads.resolve(viewer, post_id).await
    }
}
