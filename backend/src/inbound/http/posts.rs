//! Post handlers.
//!
//! ```text
//! POST   /api/posts               {"content":"hello","parent_id":1}
//! GET    /api/posts?limit=20&offset=0&user_id=<uuid>
//! GET    /api/posts/{id}
//! DELETE /api/posts/{id}
//! GET    /api/posts/{id}/replies
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde_json::json;

use crate::domain::ports::{CreatePostRequest, TimelineScope};
use crate::domain::{Error, PostId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{CreatePostBody, PostPage, PostResponse, TimelineParams};
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;

fn parse_scope(user_id: Option<&str>) -> Result<TimelineScope, Error> {
    match user_id {
        None => Ok(TimelineScope::Global),
        Some(raw) => UserId::new(raw).map(TimelineScope::Author).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "user_id", "code": "invalid_id" }))
        }),
    }
}

/// Publish a post, reply, or repost.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostBody,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid content or reference", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "Parent or repost target missing", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    viewer: CurrentUser,
    payload: web::Json<CreatePostBody>,
) -> ApiResult<HttpResponse> {
    let CreatePostBody {
        content,
        parent_id,
        repost_id,
    } = payload.into_inner();
    let view = state
        .posts
        .create_post(CreatePostRequest {
            author: viewer.id,
            content,
            parent_id: parent_id.map(PostId::new),
            repost_id: repost_id.map(PostId::new),
        })
        .await?;
    Ok(HttpResponse::Created().json(PostResponse::from(view)))
}

/// Global timeline, or one author's posts when `user_id` is given.
#[utoipa::path(
    get,
    path = "/api/posts",
    params(TimelineParams),
    responses(
        (status = 200, description = "Posts, newest first", body = PostPage),
        (status = 400, description = "Invalid paging or user id", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["posts"],
    operation_id = "listPosts"
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    viewer: CurrentUser,
    query: web::Query<TimelineParams>,
) -> ApiResult<web::Json<PostPage>> {
    let TimelineParams {
        limit,
        offset,
        user_id,
    } = query.into_inner();
    let page = state.page_request(limit, offset)?;
    let scope = parse_scope(user_id.as_deref())?;
    let timeline = state.feeds.timeline(&viewer.id, &scope, page).await?;
    Ok(web::Json(PostPage::new(timeline.posts, page)))
}

/// A single post with viewer-specific engagement fields.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "getPost"
)]
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    viewer: CurrentUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<PostResponse>> {
    let view = state
        .feeds
        .post_detail(&viewer.id, PostId::new(path.into_inner()))
        .await?;
    Ok(web::Json(view.into()))
}

/// Delete one of the caller's own posts.
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    viewer: CurrentUser,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .posts
        .delete_post(&viewer.id, PostId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Direct replies to a post, oldest first.
#[utoipa::path(
    get,
    path = "/api/posts/{id}/replies",
    params(("id" = i64, Path, description = "Parent post id")),
    responses(
        (status = 200, description = "Replies", body = [PostResponse]),
        (status = 401, description = "Login required", body = Error),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "listReplies"
)]
#[get("/posts/{id}/replies")]
pub async fn list_replies(
    state: web::Data<HttpState>,
    viewer: CurrentUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<PostResponse>>> {
    let thread = state
        .feeds
        .thread(&viewer.id, PostId::new(path.into_inner()))
        .await?;
    Ok(web::Json(
        thread.replies.into_iter().map(PostResponse::from).collect(),
    ))
}
