//! Like and bookmark handlers.
//!
//! Both toggles flip the caller's edge and report the state after the flip
//! together with the post's fresh count.

use actix_web::{get, post, web};

use crate::domain::{EngagementKind, PostId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{BookmarkResponse, LikeResponse, PageParams, PostPage};
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;

/// Toggle the caller's like on a post.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/like",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeResponse),
        (status = 401, description = "Login required", body = crate::domain::Error),
        (status = 404, description = "No such post", body = crate::domain::Error)
    ),
    tags = ["engagement"],
    operation_id = "toggleLike"
)]
#[post("/posts/{id}/like")]
pub async fn toggle_like(
    state: web::Data<HttpState>,
    viewer: CurrentUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<LikeResponse>> {
    let outcome = state
        .engagement
        .toggle(EngagementKind::Like, &viewer.id, PostId::new(path.into_inner()))
        .await?;
    Ok(web::Json(outcome.into()))
}

/// Toggle the caller's bookmark on a post.
#[utoipa::path(
    post,
    path = "/api/posts/{id}/bookmark",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Bookmark state after the toggle", body = BookmarkResponse),
        (status = 401, description = "Login required", body = crate::domain::Error),
        (status = 404, description = "No such post", body = crate::domain::Error)
    ),
    tags = ["engagement"],
    operation_id = "toggleBookmark"
)]
#[post("/posts/{id}/bookmark")]
pub async fn toggle_bookmark(
    state: web::Data<HttpState>,
    viewer: CurrentUser,
    path: web::Path<i64>,
) -> ApiResult<web::Json<BookmarkResponse>> {
    let outcome = state
        .engagement
        .toggle(
            EngagementKind::Bookmark,
            &viewer.id,
            PostId::new(path.into_inner()),
        )
        .await?;
    Ok(web::Json(outcome.into()))
}

/// The caller's bookmarks, most recently bookmarked first.
#[utoipa::path(
    get,
    path = "/api/bookmarks",
    params(PageParams),
    responses(
        (status = 200, description = "Bookmarked posts", body = PostPage),
        (status = 400, description = "Invalid paging", body = crate::domain::Error),
        (status = 401, description = "Login required", body = crate::domain::Error)
    ),
    tags = ["engagement"],
    operation_id = "listBookmarks"
)]
#[get("/bookmarks")]
pub async fn list_bookmarks(
    state: web::Data<HttpState>,
    viewer: CurrentUser,
    query: web::Query<PageParams>,
) -> ApiResult<web::Json<PostPage>> {
    let PageParams { limit, offset } = query.into_inner();
    let page = state.page_request(limit, offset)?;
    let timeline = state.feeds.bookmarks(&viewer.id, page).await?;
    Ok(web::Json(PostPage::new(timeline.posts, page)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::test_fixtures::{post, user};
    use crate::domain::{Error, PostStats, PostView, Timeline, ToggleOutcome, UserId};
    use crate::inbound::http::configure_api;
    use crate::inbound::http::test_utils::{MockPorts, body_json, session};

    #[rstest]
    #[case(EngagementKind::Like, "/api/posts/9/like", json!({"is_liked": true, "like_count": 3}))]
    #[case(
        EngagementKind::Bookmark,
        "/api/posts/9/bookmark",
        json!({"is_bookmarked": true, "bookmark_count": 3})
    )]
    #[actix_web::test]
    async fn toggle_reports_state_and_count(
        #[case] kind: EngagementKind,
        #[case] uri: &str,
        #[case] expected: Value,
    ) {
        let viewer = UserId::random();
        let caller = viewer.clone();
        let mut ports = MockPorts::signed_in(viewer);
        ports
            .engagement
            .expect_toggle()
            .withf(move |k, who, id| *k == kind && *who == caller && *id == PostId::new(9))
            .times(1)
            .return_once(|_, _, _| Ok(ToggleOutcome::new(true, 3)));
        let app =
            actix_test::init_service(App::new().app_data(ports.into_state()).configure(configure_api))
                .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri(uri).cookie(session()).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn toggle_on_missing_post_is_not_found() {
        let mut ports = MockPorts::signed_in(UserId::random());
        ports
            .engagement
            .expect_toggle()
            .return_once(|_, _, _| Err(Error::not_found("post 404 not found")));
        let app =
            actix_test::init_service(App::new().app_data(ports.into_state()).configure(configure_api))
                .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/posts/404/like")
                .cookie(session())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn toggle_requires_session() {
        let mut ports = MockPorts::default();
        ports.engagement.expect_toggle().never();
        let app =
            actix_test::init_service(App::new().app_data(ports.into_state()).configure(configure_api))
                .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri("/api/posts/1/bookmark").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn bookmarks_are_paged_for_the_caller() {
        let ada = user("ada");
        let viewer = ada.id().clone();
        let caller = viewer.clone();
        let saved = PostView {
            post: post(4, &ada, "saved", 4),
            author: ada,
            stats: PostStats {
                bookmark_count: 1,
                is_bookmarked: true,
                ..PostStats::default()
            },
            repost: None,
        };
        let mut ports = MockPorts::signed_in(viewer);
        ports
            .feeds
            .expect_bookmarks()
            .withf(move |who, page| *who == caller && page.limit() == 2 && page.offset() == 1)
            .return_once(move |_, _| {
                Ok(Timeline { posts: vec![saved] })
            });
        let app =
            actix_test::init_service(App::new().app_data(ports.into_state()).configure(configure_api))
                .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/bookmarks?limit=2&offset=1")
                .cookie(session())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["items"][0]["is_bookmarked"], json!(true));
        assert_eq!(body["limit"], json!(2));
        assert_eq!(body["offset"], json!(1));
    }
}
