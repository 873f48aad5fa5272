//! PostgreSQL-backed `EngagementRepository` over the `likes` and
//! `bookmarks` edge tables.
//!
//! Toggle runs in one transaction: delete the edge, and only when nothing was
//! deleted insert it with `ON CONFLICT DO NOTHING`, then recount. The
//! composite primary key makes a double insert impossible, so two racing
//! toggles converge on a single edge rather than duplicating it.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::bb8::PooledConnection;

use crate::domain::ports::{EngagementRepository, EngagementRepositoryError};
use crate::domain::{EngagementKind, PostId, ToggleOutcome, UserId};

use super::diesel_basic_error_mapping::{
    Violation, map_basic_diesel_error, map_basic_pool_error, violation,
};
use super::models::raw_post_ids;
use super::pool::{DbPool, PoolError};

/// Generate the edge queries for one table. Both tables share the
/// `(user_id, post_id, created_at)` shape.
macro_rules! edge_table_queries {
    ($module:ident, $table:ident) => {
        mod $module {
            use chrono::{DateTime, Utc};
            use diesel::dsl::{count_star, exists};
            use diesel::prelude::*;
            use diesel_async::scoped_futures::ScopedFutureExt as _;
            use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
            use uuid::Uuid;

            use super::super::schema::$table;

            pub(super) async fn exists_edge(
                conn: &mut AsyncPgConnection,
                user: Uuid,
                post: i64,
            ) -> QueryResult<bool> {
                diesel::select(exists(
                    $table::table
                        .filter($table::user_id.eq(user))
                        .filter($table::post_id.eq(post)),
                ))
                .get_result(conn)
                .await
            }

            pub(super) async fn toggle(
                conn: &mut AsyncPgConnection,
                user: Uuid,
                post: i64,
                at: DateTime<Utc>,
            ) -> QueryResult<(bool, i64)> {
                conn.transaction(|conn| {
                    async move {
                        let removed = diesel::delete(
                            $table::table
                                .filter($table::user_id.eq(user))
                                .filter($table::post_id.eq(post)),
                        )
                        .execute(conn)
                        .await?;

                        let active = if removed == 0 {
                            diesel::insert_into($table::table)
                                .values((
                                    $table::user_id.eq(user),
                                    $table::post_id.eq(post),
                                    $table::created_at.eq(at),
                                ))
                                .on_conflict_do_nothing()
                                .execute(conn)
                                .await?;
                            true
                        } else {
                            false
                        };

                        let count: i64 = $table::table
                            .filter($table::post_id.eq(post))
                            .count()
                            .get_result(conn)
                            .await?;
                        Ok((active, count))
                    }
                    .scope_boxed()
                })
                .await
            }

            pub(super) async fn count(conn: &mut AsyncPgConnection, post: i64) -> QueryResult<i64> {
                $table::table
                    .filter($table::post_id.eq(post))
                    .count()
                    .get_result(conn)
                    .await
            }

            pub(super) async fn counts(
                conn: &mut AsyncPgConnection,
                posts: Vec<i64>,
            ) -> QueryResult<Vec<(i64, i64)>> {
                $table::table
                    .filter($table::post_id.eq_any(posts))
                    .group_by($table::post_id)
                    .select(($table::post_id, count_star()))
                    .load(conn)
                    .await
            }

            pub(super) async fn active_for(
                conn: &mut AsyncPgConnection,
                user: Uuid,
                posts: Vec<i64>,
            ) -> QueryResult<Vec<i64>> {
                $table::table
                    .filter($table::user_id.eq(user))
                    .filter($table::post_id.eq_any(posts))
                    .select($table::post_id)
                    .load(conn)
                    .await
            }
        }
    };
}

edge_table_queries!(like_edges, likes);
edge_table_queries!(bookmark_edges, bookmarks);

/// Diesel implementation of [`EngagementRepository`].
#[derive(Clone)]
pub struct DieselEngagementRepository {
    pool: DbPool,
}

impl DieselEngagementRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, EngagementRepositoryError> {
        self.pool.get().await.map_err(map_pool_error)
    }
}

fn map_pool_error(error: PoolError) -> EngagementRepositoryError {
    map_basic_pool_error(error, EngagementRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> EngagementRepositoryError {
    map_basic_diesel_error(
        error,
        EngagementRepositoryError::query,
        EngagementRepositoryError::connection,
    )
}

fn map_toggle_error(error: diesel::result::Error, post: PostId) -> EngagementRepositoryError {
    match violation(&error) {
        Some(Violation::ForeignKey(_)) => EngagementRepositoryError::missing_post(post.get()),
        _ => map_diesel_error(error),
    }
}

fn into_counts(rows: Vec<(i64, i64)>) -> HashMap<PostId, i64> {
    rows.into_iter()
        .map(|(id, count)| (PostId::new(id), count))
        .collect()
}

#[async_trait]
impl EngagementRepository for DieselEngagementRepository {
    async fn exists(
        &self,
        kind: EngagementKind,
        user: &UserId,
        post: PostId,
    ) -> Result<bool, EngagementRepositoryError> {
        let mut conn = self.connection().await?;
        let user = *user.as_uuid();
        let found = match kind {
            EngagementKind::Like => like_edges::exists_edge(&mut conn, user, post.get()).await,
            EngagementKind::Bookmark => {
                bookmark_edges::exists_edge(&mut conn, user, post.get()).await
            }
        };
        found.map_err(map_diesel_error)
    }

    async fn toggle(
        &self,
        kind: EngagementKind,
        user: &UserId,
        post: PostId,
        at: DateTime<Utc>,
    ) -> Result<ToggleOutcome, EngagementRepositoryError> {
        let mut conn = self.connection().await?;
        let user = *user.as_uuid();
        let (active, count) = match kind {
            EngagementKind::Like => like_edges::toggle(&mut conn, user, post.get(), at).await,
            EngagementKind::Bookmark => {
                bookmark_edges::toggle(&mut conn, user, post.get(), at).await
            }
        }
        .map_err(|err| map_toggle_error(err, post))?;
        Ok(ToggleOutcome::new(active, count))
    }

    async fn count(
        &self,
        kind: EngagementKind,
        post: PostId,
    ) -> Result<i64, EngagementRepositoryError> {
        let mut conn = self.connection().await?;
        let total = match kind {
            EngagementKind::Like => like_edges::count(&mut conn, post.get()).await,
            EngagementKind::Bookmark => bookmark_edges::count(&mut conn, post.get()).await,
        };
        total.map_err(map_diesel_error)
    }

    async fn counts(
        &self,
        kind: EngagementKind,
        ids: &[PostId],
    ) -> Result<HashMap<PostId, i64>, EngagementRepositoryError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.connection().await?;
        let raw = raw_post_ids(ids);
        let rows = match kind {
            EngagementKind::Like => like_edges::counts(&mut conn, raw).await,
            EngagementKind::Bookmark => bookmark_edges::counts(&mut conn, raw).await,
        }
        .map_err(map_diesel_error)?;
        Ok(into_counts(rows))
    }

    async fn active_for(
        &self,
        kind: EngagementKind,
        user: &UserId,
        ids: &[PostId],
    ) -> Result<HashSet<PostId>, EngagementRepositoryError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let mut conn = self.connection().await?;
        let user = *user.as_uuid();
        let raw = raw_post_ids(ids);
        let rows = match kind {
            EngagementKind::Like => like_edges::active_for(&mut conn, user, raw).await,
            EngagementKind::Bookmark => bookmark_edges::active_for(&mut conn, user, raw).await,
        }
        .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(PostId::new).collect())
    }
}
