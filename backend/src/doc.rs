//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler, the wire schemas they exchange,
//! and the `session_id` cookie scheme. Swagger UI serves it at `/docs` in
//! debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::dto::{
    BookmarkResponse, CreatePostBody, LikeResponse, LoginRequest, PostPage, PostResponse,
    RegisterRequest, UserResponse,
};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session_id",
                "Session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Chirp backend API",
        description = "Short posts, replies, reposts, likes, and bookmarks behind cookie sessions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::current_user,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::posts::list_replies,
        crate::inbound::http::engagement::toggle_like,
        crate::inbound::http::engagement::toggle_bookmark,
        crate::inbound::http::engagement::list_bookmarks,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterRequest,
        LoginRequest,
        UserResponse,
        CreatePostBody,
        PostResponse,
        PostPage,
        LikeResponse,
        BookmarkResponse,
    )),
    tags(
        (name = "users", description = "Accounts and sessions"),
        (name = "posts", description = "Posts, replies, and reposts"),
        (name = "engagement", description = "Likes and bookmarks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
