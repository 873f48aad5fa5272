//! Wire shapes for the REST surface.
//!
//! Field names are snake_case. Domain types stay free of serde wire concerns;
//! conversion happens here.

use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{EmbeddedPost, Post, PostStats, PostView, ToggleOutcome, User};

/// Body of `POST /api/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "hunter2hunter2")]
    pub password: String,
}

/// Body of `POST /api/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

/// Public account view. The credential hash is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            bio: user.bio().to_owned(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Body of `POST /api/posts`. `content` may be omitted for a pure repost.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreatePostBody {
    #[serde(default)]
    #[schema(example = "hello world")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repost_id: Option<i64>,
}

/// A post enriched for the requesting viewer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct PostResponse {
    pub id: i64,
    pub content: String,
    pub author: UserResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repost_id: Option<i64>,
    /// The reposted post, resolved one level deep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub repost: Option<Box<PostResponse>>,
    pub like_count: i64,
    pub is_liked: bool,
    pub bookmark_count: i64,
    pub is_bookmarked: bool,
    pub reply_count: i64,
    pub repost_count: i64,
    pub is_reposted: bool,
    pub created_at: DateTime<Utc>,
}

impl PostResponse {
    fn from_parts(post: Post, author: User, stats: PostStats) -> Self {
        Self {
            id: post.id.get(),
            content: post.content,
            author: author.into(),
            parent_id: post.parent_id.map(|id| id.get()),
            repost_id: post.repost_id.map(|id| id.get()),
            repost: None,
            like_count: stats.like_count,
            is_liked: stats.is_liked,
            bookmark_count: stats.bookmark_count,
            is_bookmarked: stats.is_bookmarked,
            reply_count: stats.reply_count,
            repost_count: stats.repost_count,
            is_reposted: stats.is_reposted,
            created_at: post.created_at,
        }
    }
}

impl From<EmbeddedPost> for PostResponse {
    fn from(embedded: EmbeddedPost) -> Self {
        Self::from_parts(embedded.post, embedded.author, embedded.stats)
    }
}

impl From<PostView> for PostResponse {
    fn from(view: PostView) -> Self {
        let PostView {
            post,
            author,
            stats,
            repost,
        } = view;
        Self {
            repost: repost.map(|target| Box::new(target.into())),
            ..Self::from_parts(post, author, stats)
        }
    }
}

/// A page of enriched posts.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PostPage {
    pub items: Vec<PostResponse>,
    #[schema(example = 20)]
    pub limit: u32,
    #[schema(example = 0)]
    pub offset: u64,
}

impl PostPage {
    pub fn new(views: Vec<PostView>, request: PageRequest) -> Self {
        let Page {
            items,
            limit,
            offset,
        } = Page::new(views, request).map(PostResponse::from);
        Self {
            items,
            limit,
            offset,
        }
    }
}

/// Result of `POST /api/posts/{id}/like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct LikeResponse {
    pub is_liked: bool,
    pub like_count: i64,
}

impl From<ToggleOutcome> for LikeResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            is_liked: outcome.active,
            like_count: outcome.count,
        }
    }
}

/// Result of `POST /api/posts/{id}/bookmark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct BookmarkResponse {
    pub is_bookmarked: bool,
    pub bookmark_count: i64,
}

impl From<ToggleOutcome> for BookmarkResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            is_bookmarked: outcome.active,
            bookmark_count: outcome.count,
        }
    }
}

/// `limit`/`offset` query parameters. Validation happens in
/// [`crate::inbound::http::state::HttpState::page_request`].
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Page size; clamped to the configured maximum.
    pub limit: Option<i64>,
    /// Number of posts to skip.
    pub offset: Option<i64>,
}

/// Query parameters for `GET /api/posts`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimelineParams {
    /// Page size; clamped to the configured maximum.
    pub limit: Option<i64>,
    /// Number of posts to skip.
    pub offset: Option<i64>,
    /// Restrict the feed to one author, replies and reposts included.
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::PostId;
    use crate::domain::test_fixtures::{post, repost, user};

    #[rstest]
    fn repost_view_embeds_target_and_omits_empty_links() {
        let ada = user("ada");
        let original = post(1, &ada, "hello", 1);
        let wrapper = repost(2, &ada, PostId::new(1), 2);
        let view = PostView {
            post: wrapper,
            author: ada.clone(),
            stats: PostStats::default(),
            repost: Some(EmbeddedPost {
                post: original,
                author: ada,
                stats: PostStats {
                    like_count: 3,
                    ..PostStats::default()
                },
            }),
        };

        let value = serde_json::to_value(PostResponse::from(view)).expect("serialise");
        assert_eq!(value["repost_id"], json!(1));
        assert_eq!(value["repost"]["id"], json!(1));
        assert_eq!(value["repost"]["like_count"], json!(3));
        assert!(value.get("parent_id").is_none());
        assert!(value["repost"].get("repost").is_none());
        assert_eq!(value["author"]["username"], json!("ada"));
    }

    #[rstest]
    fn toggle_outcomes_use_relation_specific_names() {
        let outcome = ToggleOutcome::new(true, 4);
        assert_eq!(
            serde_json::to_value(LikeResponse::from(outcome)).expect("like"),
            json!({"is_liked": true, "like_count": 4})
        );
        assert_eq!(
            serde_json::to_value(BookmarkResponse::from(outcome)).expect("bookmark"),
            json!({"is_bookmarked": true, "bookmark_count": 4})
        );
    }

    #[rstest]
    fn create_body_defaults_missing_content() {
        let body: CreatePostBody =
            serde_json::from_value(json!({"repost_id": 9})).expect("deserialise");
        assert!(body.content.is_empty());
        assert_eq!(body.repost_id, Some(9));
    }
}
