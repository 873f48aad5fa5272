//! Batched enrichment of post lists into viewer-specific views.
//!
//! A page is enriched in two round-trip phases regardless of its size:
//!
//! 1. Resolve the repost targets referenced by the page with one
//!    `find_many`.
//! 2. Over the combined id set (page posts plus targets) issue one query per
//!    derived field concurrently: like and bookmark counts, the viewer's like
//!    and bookmark edges, reply and repost counts, the viewer's reposts, and
//!    the authors.
//!
//! Targets are embedded as [`EmbeddedPost`], which has no repost slot, so
//! resolution never goes deeper than one level. A target deleted between the
//! listing and phase 1 is dropped from the view instead of failing the page.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ports::{EngagementRepository, PostRepository, UserRepository};
use crate::domain::store_errors::{map_engagement_error, map_post_error, map_user_error};
use crate::domain::{
    EmbeddedPost, EngagementKind, Error, Post, PostId, PostStats, PostView, Timeline, User,
    UserId,
};

/// Enriches posts with engagement fields for a viewer.
pub struct TimelineAssembler<P, E, U> {
    posts: Arc<P>,
    engagement: Arc<E>,
    users: Arc<U>,
}

impl<P, E, U> Clone for TimelineAssembler<P, E, U> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            engagement: Arc::clone(&self.engagement),
            users: Arc::clone(&self.users),
        }
    }
}

#[derive(Default)]
struct Enrichment {
    like_counts: HashMap<PostId, i64>,
    liked: HashSet<PostId>,
    bookmark_counts: HashMap<PostId, i64>,
    bookmarked: HashSet<PostId>,
    reply_counts: HashMap<PostId, i64>,
    repost_counts: HashMap<PostId, i64>,
    reposted: HashSet<PostId>,
    authors: HashMap<UserId, User>,
}

impl Enrichment {
    fn stats_for(&self, id: PostId) -> PostStats {
        PostStats {
            like_count: self.like_counts.get(&id).copied().unwrap_or(0),
            is_liked: self.liked.contains(&id),
            bookmark_count: self.bookmark_counts.get(&id).copied().unwrap_or(0),
            is_bookmarked: self.bookmarked.contains(&id),
            reply_count: self.reply_counts.get(&id).copied().unwrap_or(0),
            repost_count: self.repost_counts.get(&id).copied().unwrap_or(0),
            is_reposted: self.reposted.contains(&id),
        }
    }

    fn author_of(&self, post: &Post) -> Option<User> {
        self.authors.get(&post.author_id).cloned()
    }
}

impl<P, E, U> TimelineAssembler<P, E, U>
where
    P: PostRepository,
    E: EngagementRepository,
    U: UserRepository,
{
    /// Create an assembler over the three stores it reads from.
    pub fn new(posts: Arc<P>, engagement: Arc<E>, users: Arc<U>) -> Self {
        Self {
            posts,
            engagement,
            users,
        }
    }

    /// Enrich `posts` for `viewer`, preserving their order.
    ///
    /// Posts whose author can no longer be loaded are skipped.
    pub async fn assemble(&self, viewer: &UserId, posts: Vec<Post>) -> Result<Timeline, Error> {
        if posts.is_empty() {
            return Ok(Timeline::default());
        }

        let targets = self.load_repost_targets(&posts).await?;
        let ids = collect_post_ids(&posts, &targets);
        let author_ids = collect_author_ids(&posts, &targets);
        let enrichment = self.load_enrichment(viewer, &ids, &author_ids).await?;

        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            let Some(author) = enrichment.author_of(&post) else {
                warn!(post_id = %post.id, author_id = %post.author_id, "author missing; skipping post");
                continue;
            };
            let stats = enrichment.stats_for(post.id);

            let repost = post
                .repost_id
                .and_then(|target_id| targets.get(&target_id))
                .and_then(|target| embed(target, &enrichment));

            views.push(PostView {
                post,
                author,
                stats,
                repost,
            });
        }

        debug!(count = views.len(), targets = targets.len(), "timeline assembled");
        Ok(Timeline { posts: views })
    }

    /// Enrich a single post. `None` means its author vanished.
    pub async fn assemble_one(&self, viewer: &UserId, post: Post) -> Result<Option<PostView>, Error> {
        let timeline = self.assemble(viewer, vec![post]).await?;
        Ok(timeline.posts.into_iter().next())
    }

    async fn load_repost_targets(&self, posts: &[Post]) -> Result<HashMap<PostId, Post>, Error> {
        let mut target_ids: Vec<PostId> = posts.iter().filter_map(|post| post.repost_id).collect();
        target_ids.sort_unstable();
        target_ids.dedup();
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let found = self
            .posts
            .find_many(&target_ids)
            .await
            .map_err(map_post_error)?;
        Ok(found.into_iter().map(|post| (post.id, post)).collect())
    }

    async fn load_enrichment(
        &self,
        viewer: &UserId,
        ids: &[PostId],
        author_ids: &[UserId],
    ) -> Result<Enrichment, Error> {
        let engagement = &self.engagement;
        let posts = &self.posts;
        let users = &self.users;

        let (
            like_counts,
            liked,
            bookmark_counts,
            bookmarked,
            reply_counts,
            repost_counts,
            reposted,
            authors,
        ) = tokio::try_join!(
            async {
                engagement
                    .counts(EngagementKind::Like, ids)
                    .await
                    .map_err(map_engagement_error)
            },
            async {
                engagement
                    .active_for(EngagementKind::Like, viewer, ids)
                    .await
                    .map_err(map_engagement_error)
            },
            async {
                engagement
                    .counts(EngagementKind::Bookmark, ids)
                    .await
                    .map_err(map_engagement_error)
            },
            async {
                engagement
                    .active_for(EngagementKind::Bookmark, viewer, ids)
                    .await
                    .map_err(map_engagement_error)
            },
            async { posts.reply_counts(ids).await.map_err(map_post_error) },
            async { posts.repost_counts(ids).await.map_err(map_post_error) },
            async { posts.reposted_by(viewer, ids).await.map_err(map_post_error) },
            async { users.find_many(author_ids).await.map_err(map_user_error) },
        )?;

        Ok(Enrichment {
            like_counts,
            liked,
            bookmark_counts,
            bookmarked,
            reply_counts,
            repost_counts,
            reposted,
            authors: authors
                .into_iter()
                .map(|user| (user.id().clone(), user))
                .collect(),
        })
    }
}

fn embed(target: &Post, enrichment: &Enrichment) -> Option<EmbeddedPost> {
    let author = enrichment.author_of(target)?;
    Some(EmbeddedPost {
        post: target.clone(),
        author,
        stats: enrichment.stats_for(target.id),
    })
}

fn collect_post_ids(posts: &[Post], targets: &HashMap<PostId, Post>) -> Vec<PostId> {
    let mut ids: Vec<PostId> = posts
        .iter()
        .map(|post| post.id)
        .chain(targets.keys().copied())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn collect_author_ids(posts: &[Post], targets: &HashMap<PostId, Post>) -> Vec<UserId> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .chain(targets.values())
        .filter(|post| seen.insert(post.author_id.clone()))
        .map(|post| post.author_id.clone())
        .collect()
}

#[cfg(test)]
#[path = "timeline_assembler_tests.rs"]
mod tests;
