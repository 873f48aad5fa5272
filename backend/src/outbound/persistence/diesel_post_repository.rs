//! PostgreSQL-backed `PostRepository`.
//!
//! Aggregate reads (`reply_counts`, `repost_counts`, `reposted_by`) take the
//! whole id set of a page and answer with one `GROUP BY` or `DISTINCT` query
//! each.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, exists};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{PostRepository, PostRepositoryError, TimelineScope};
use crate::domain::{Post, PostDraft, PostId, UserId};

use super::diesel_basic_error_mapping::{
    Violation, map_basic_diesel_error, map_basic_pool_error, violation,
};
use super::models::{NewPostRow, PostRow, raw_post_ids};
use super::pool::{DbPool, PoolError};
use super::schema::{bookmarks, posts};

/// Diesel implementation of [`PostRepository`].
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PostRepositoryError {
    map_basic_pool_error(error, PostRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PostRepositoryError {
    map_basic_diesel_error(
        error,
        PostRepositoryError::query,
        PostRepositoryError::connection,
    )
}

fn map_create_error(error: diesel::result::Error, draft: &PostDraft) -> PostRepositoryError {
    match violation(&error) {
        Some(Violation::ForeignKey(constraint)) => {
            let message = match constraint {
                Some(name) if name.contains("parent") => {
                    format!("parent post {} not found", fmt_id(draft.parent_id()))
                }
                Some(name) if name.contains("repost") => {
                    format!("repost target {} not found", fmt_id(draft.repost_id()))
                }
                _ => format!("author {} not found", draft.author_id()),
            };
            PostRepositoryError::missing_reference(message)
        }
        _ => map_diesel_error(error),
    }
}

fn fmt_id(id: Option<PostId>) -> String {
    id.map_or_else(|| "<none>".to_owned(), |id| id.to_string())
}

fn page_bounds(page: PageRequest) -> (i64, i64) {
    (
        i64::from(page.limit()),
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
    )
}

fn counts_by_key(rows: Vec<(Option<i64>, i64)>) -> HashMap<PostId, i64> {
    rows.into_iter()
        .filter_map(|(id, count)| id.map(|id| (PostId::new(id), count)))
        .collect()
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn create(
        &self,
        draft: &PostDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Post, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewPostRow {
            author_id: *draft.author_id().as_uuid(),
            content: draft.content(),
            parent_id: draft.parent_id().map(PostId::get),
            repost_id: draft.repost_id().map(PostId::get),
            created_at,
        };

        diesel::insert_into(posts::table)
            .values(&row)
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Post::from)
            .map_err(|err| map_create_error(err, draft))
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PostRow> = posts::table
            .find(id.get())
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Post::from))
    }

    async fn find_many(&self, ids: &[PostId]) -> Result<Vec<Post>, PostRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PostRow> = posts::table
            .filter(posts::id.eq_any(raw_post_ids(ids)))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn list_timeline(
        &self,
        scope: &TimelineScope,
        page: PageRequest,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = page_bounds(page);

        let mut query = posts::table.select(PostRow::as_select()).into_boxed();
        query = match scope {
            TimelineScope::Global => query.filter(posts::parent_id.is_null()),
            TimelineScope::Author(author) => query.filter(posts::author_id.eq(*author.as_uuid())),
        };

        let rows: Vec<PostRow> = query
            .order((posts::created_at.desc(), posts::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn list_bookmarked(
        &self,
        user: &UserId,
        page: PageRequest,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (limit, offset) = page_bounds(page);

        let rows: Vec<PostRow> = bookmarks::table
            .inner_join(posts::table)
            .filter(bookmarks::user_id.eq(user.as_uuid()))
            .order((bookmarks::created_at.desc(), posts::id.desc()))
            .select(PostRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn list_replies(&self, parent: PostId) -> Result<Vec<Post>, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PostRow> = posts::table
            .filter(posts::parent_id.eq(parent.get()))
            .order((posts::created_at.asc(), posts::id.asc()))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn count_replies(&self, id: PostId) -> Result<i64, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        posts::table
            .filter(posts::parent_id.eq(id.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn count_reposts(&self, id: PostId) -> Result<i64, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        posts::table
            .filter(posts::repost_id.eq(id.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn has_reposted(&self, user: &UserId, id: PostId) -> Result<bool, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            posts::table
                .filter(posts::author_id.eq(user.as_uuid()))
                .filter(posts::repost_id.eq(id.get())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn reply_counts(
        &self,
        ids: &[PostId],
    ) -> Result<HashMap<PostId, i64>, PostRepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(Option<i64>, i64)> = posts::table
            .filter(posts::parent_id.eq_any(raw_post_ids(ids)))
            .group_by(posts::parent_id)
            .select((posts::parent_id, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(counts_by_key(rows))
    }

    async fn repost_counts(
        &self,
        ids: &[PostId],
    ) -> Result<HashMap<PostId, i64>, PostRepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(Option<i64>, i64)> = posts::table
            .filter(posts::repost_id.eq_any(raw_post_ids(ids)))
            .group_by(posts::repost_id)
            .select((posts::repost_id, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(counts_by_key(rows))
    }

    async fn reposted_by(
        &self,
        user: &UserId,
        ids: &[PostId],
    ) -> Result<HashSet<PostId>, PostRepositoryError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<Option<i64>> = posts::table
            .filter(posts::author_id.eq(user.as_uuid()))
            .filter(posts::repost_id.eq_any(raw_post_ids(ids)))
            .select(posts::repost_id)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().flatten().map(PostId::new).collect())
    }

    async fn delete(&self, id: PostId) -> Result<bool, PostRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(posts::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
