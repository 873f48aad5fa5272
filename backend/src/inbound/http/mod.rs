//! HTTP inbound adapter exposing REST endpoints.
//!
//! Everything except the health probes is mounted under `/api`. Extractor
//! failures are routed through [`error`] so clients always receive the
//! domain error envelope.

pub mod dto;
pub mod engagement;
pub mod error;
pub mod health;
pub mod posts;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api` scope with every REST handler.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
            .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
            .service(users::register)
            .service(users::login)
            .service(users::logout)
            .service(users::current_user)
            .service(users::get_user)
            .service(posts::create_post)
            .service(posts::list_posts)
            .service(posts::list_replies)
            .service(posts::get_post)
            .service(posts::delete_post)
            .service(engagement::toggle_like)
            .service(engagement::toggle_bookmark)
            .service(engagement::list_bookmarks),
    );
}
