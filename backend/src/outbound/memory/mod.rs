//! Process-local implementation of the user, post, and engagement ports.
//!
//! Backs the server when no database is configured and drives the HTTP
//! integration tests. One mutex guards every table so each port call,
//! including an engagement toggle, is a single atomic step.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;

use crate::domain::ports::{
    EngagementRepository, EngagementRepositoryError, PostRepository, PostRepositoryError,
    TimelineScope, UserPersistenceError, UserRepository,
};
use crate::domain::{
    EngagementKind, PasswordDigest, Post, PostDraft, PostId, ToggleOutcome, User, UserId, Username,
};

type EdgeKey = (EngagementKind, UserId, PostId);

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, (User, PasswordDigest)>,
    posts: BTreeMap<PostId, Post>,
    last_post_id: i64,
    edges: HashMap<EdgeKey, DateTime<Utc>>,
}

impl Tables {
    fn edge_count(&self, kind: EngagementKind, post: PostId) -> i64 {
        let total = self
            .edges
            .keys()
            .filter(|(k, _, p)| *k == kind && *p == post)
            .count();
        i64::try_from(total).unwrap_or(i64::MAX)
    }

    fn count_posts(&self, matches: impl Fn(&Post) -> bool) -> i64 {
        let total = self.posts.values().filter(|post| matches(post)).count();
        i64::try_from(total).unwrap_or(i64::MAX)
    }
}

/// In-memory social graph shared by the three repository ports.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(
        &self,
        poisoned: impl FnOnce(&'static str) -> E,
    ) -> Result<MutexGuard<'_, Tables>, E> {
        self.tables
            .lock()
            .map_err(|_| poisoned("in-memory store lock poisoned"))
    }
}

/// Newest first, id breaking ties.
fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

fn counts_where(
    tables: &Tables,
    ids: &[PostId],
    key: impl Fn(&Post) -> Option<PostId>,
) -> HashMap<PostId, i64> {
    let wanted: HashSet<PostId> = ids.iter().copied().collect();
    let mut counts = HashMap::new();
    for target in tables.posts.values().filter_map(key) {
        if wanted.contains(&target) {
            *counts.entry(target).or_insert(0) += 1;
        }
    }
    counts
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(
        &self,
        user: &User,
        password: &PasswordDigest,
    ) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock(UserPersistenceError::query)?;
        for (existing, _) in tables.users.values() {
            if existing.username() == user.username() {
                return Err(UserPersistenceError::duplicate_username(
                    user.username().as_ref(),
                ));
            }
            if existing.email() == user.email() {
                return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
            }
        }
        tables
            .users
            .insert(user.id().clone(), (user.clone(), password.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::query)?;
        Ok(tables.users.get(id).map(|(user, _)| user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::query)?;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| user.username() == username)
            .map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(User, PasswordDigest)>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::query)?;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| user.email().as_ref() == email)
            .cloned())
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::query)?;
        Ok(ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| tables.users.get(id).map(|(user, _)| user.clone()))
            .collect())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(
        &self,
        draft: &PostDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Post, PostRepositoryError> {
        let mut tables = self.lock(PostRepositoryError::query)?;
        if !tables.users.contains_key(draft.author_id()) {
            return Err(PostRepositoryError::missing_reference(format!(
                "author {} not found",
                draft.author_id()
            )));
        }
        let references = [
            ("parent post", draft.parent_id()),
            ("repost target", draft.repost_id()),
        ];
        for (label, reference) in references {
            if let Some(id) = reference {
                if !tables.posts.contains_key(&id) {
                    return Err(PostRepositoryError::missing_reference(format!(
                        "{label} {id} not found"
                    )));
                }
            }
        }

        tables.last_post_id += 1;
        let post = Post {
            id: PostId::new(tables.last_post_id),
            author_id: draft.author_id().clone(),
            content: draft.content().to_owned(),
            parent_id: draft.parent_id(),
            repost_id: draft.repost_id(),
            created_at,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        Ok(tables.posts.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[PostId]) -> Result<Vec<Post>, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        let wanted: HashSet<PostId> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| tables.posts.get(&id).cloned())
            .collect())
    }

    async fn list_timeline(
        &self,
        scope: &TimelineScope,
        page: PageRequest,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        let mut selected: Vec<Post> = tables
            .posts
            .values()
            .filter(|post| match scope {
                TimelineScope::Global => post.parent_id.is_none(),
                TimelineScope::Author(author) => post.author_id == *author,
            })
            .cloned()
            .collect();
        newest_first(&mut selected);
        Ok(page.apply(&selected))
    }

    async fn list_bookmarked(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        let mut marked: Vec<(DateTime<Utc>, Post)> = tables
            .edges
            .iter()
            .filter(|((kind, owner, _), _)| *kind == EngagementKind::Bookmark && owner == user)
            .filter_map(|((_, _, post), at)| tables.posts.get(post).map(|p| (*at, p.clone())))
            .collect();
        marked.sort_by(|(a_at, a), (b_at, b)| b_at.cmp(a_at).then(b.id.cmp(&a.id)));
        let ordered: Vec<Post> = marked.into_iter().map(|(_, post)| post).collect();
        Ok(page.apply(&ordered))
    }

    async fn list_replies(&self, parent: PostId) -> Result<Vec<Post>, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        let mut replies: Vec<Post> = tables
            .posts
            .values()
            .filter(|post| post.parent_id == Some(parent))
            .cloned()
            .collect();
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(replies)
    }

    async fn count_replies(&self, id: PostId) -> Result<i64, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        Ok(tables.count_posts(|post| post.parent_id == Some(id)))
    }

    async fn count_reposts(&self, id: PostId) -> Result<i64, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        Ok(tables.count_posts(|post| post.repost_id == Some(id)))
    }

    async fn has_reposted(&self, user: &UserId, id: PostId) -> Result<bool, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        Ok(tables
            .posts
            .values()
            .any(|post| post.author_id == *user && post.repost_id == Some(id)))
    }

    async fn reply_counts(
        &self,
        ids: &[PostId],
    ) -> Result<HashMap<PostId, i64>, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        Ok(counts_where(&tables, ids, |post| post.parent_id))
    }

    async fn repost_counts(
        &self,
        ids: &[PostId],
    ) -> Result<HashMap<PostId, i64>, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        Ok(counts_where(&tables, ids, |post| post.repost_id))
    }

    async fn reposted_by(
        &self,
        user: &UserId,
        ids: &[PostId],
    ) -> Result<HashSet<PostId>, PostRepositoryError> {
        let tables = self.lock(PostRepositoryError::query)?;
        let wanted: HashSet<PostId> = ids.iter().copied().collect();
        Ok(tables
            .posts
            .values()
            .filter(|post| post.author_id == *user)
            .filter_map(|post| post.repost_id)
            .filter(|target| wanted.contains(target))
            .collect())
    }

    async fn delete(&self, id: PostId) -> Result<bool, PostRepositoryError> {
        let mut tables = self.lock(PostRepositoryError::query)?;
        if !tables.posts.contains_key(&id) {
            return Ok(false);
        }
        // Replies and reposts go with the post, transitively.
        let mut removed = HashSet::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if !removed.insert(next) {
                continue;
            }
            pending.extend(
                tables
                    .posts
                    .values()
                    .filter(|post| post.parent_id == Some(next) || post.repost_id == Some(next))
                    .map(|post| post.id),
            );
        }
        tables.posts.retain(|post_id, _| !removed.contains(post_id));
        tables.edges.retain(|(_, _, post), _| !removed.contains(post));
        Ok(true)
    }
}

#[async_trait]
impl EngagementRepository for InMemoryStore {
    async fn exists(
        &self,
        kind: EngagementKind,
        user: &UserId,
        post: PostId,
    ) -> Result<bool, EngagementRepositoryError> {
        let tables = self.lock(EngagementRepositoryError::query)?;
        Ok(tables.edges.contains_key(&(kind, user.clone(), post)))
    }

    async fn toggle(
        &self,
        kind: EngagementKind,
        user: &UserId,
        post: PostId,
        at: DateTime<Utc>,
    ) -> Result<ToggleOutcome, EngagementRepositoryError> {
        let mut tables = self.lock(EngagementRepositoryError::query)?;
        if !tables.posts.contains_key(&post) {
            return Err(EngagementRepositoryError::missing_post(post.get()));
        }
        let key = (kind, user.clone(), post);
        let active = if tables.edges.remove(&key).is_some() {
            false
        } else {
            tables.edges.insert(key, at);
            true
        };
        Ok(ToggleOutcome::new(active, tables.edge_count(kind, post)))
    }

    async fn count(
        &self,
        kind: EngagementKind,
        post: PostId,
    ) -> Result<i64, EngagementRepositoryError> {
        let tables = self.lock(EngagementRepositoryError::query)?;
        Ok(tables.edge_count(kind, post))
    }

    async fn counts(
        &self,
        kind: EngagementKind,
        ids: &[PostId],
    ) -> Result<HashMap<PostId, i64>, EngagementRepositoryError> {
        let tables = self.lock(EngagementRepositoryError::query)?;
        let wanted: HashSet<PostId> = ids.iter().copied().collect();
        let mut counts = HashMap::new();
        for (edge_kind, _, post) in tables.edges.keys() {
            if *edge_kind == kind && wanted.contains(post) {
                *counts.entry(*post).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn active_for(
        &self,
        kind: EngagementKind,
        user: &UserId,
        ids: &[PostId],
    ) -> Result<HashSet<PostId>, EngagementRepositoryError> {
        let tables = self.lock(EngagementRepositoryError::query)?;
        Ok(ids
            .iter()
            .copied()
            .filter(|post| tables.edges.contains_key(&(kind, user.clone(), *post)))
            .collect())
    }
}
