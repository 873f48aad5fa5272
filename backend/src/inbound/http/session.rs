//! Session cookie helpers to keep HTTP handlers free of framework-specific
//! logic.
//!
//! The cookie holds an opaque [`SessionToken`]. Handlers ask for a
//! [`CurrentUser`] and never touch the cookie jar directly.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, SESSION_TTL, SessionToken, UserId};

use super::state::HttpState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Authenticated caller resolved from the `session_id` cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub token: SessionToken,
}

/// Read the raw session token from the request, if any.
pub fn session_token(req: &HttpRequest) -> Option<SessionToken> {
    req.cookie(SESSION_COOKIE)
        .and_then(|cookie| SessionToken::parse(cookie.value()))
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = session_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not registered"))?;
            let token = token.ok_or_else(|| Error::unauthorized("login required"))?;
            let id = state.identity.authenticate(&token).await?;
            Ok(Self { id, token })
        })
    }
}

fn max_age() -> CookieDuration {
    CookieDuration::seconds(i64::try_from(SESSION_TTL.as_secs()).unwrap_or(i64::MAX))
}

/// Cookie issued at login: `HttpOnly`, `Path=/`, `SameSite=Lax`, one day.
pub fn session_cookie(token: &SessionToken, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.as_str().to_owned())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age())
        .finish()
}

/// Cookie that instructs the client to drop its session.
pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .finish();
    cookie.make_removal();
    cookie
}
