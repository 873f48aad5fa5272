//! In-memory application harness shared by the HTTP integration suites.
//!
//! Every adapter runs in process memory: the post graph, the engagement
//! ledger, accounts, and sessions. State lives in `web::Data`, so a harness
//! can rebuild the service per request without losing data.

use std::sync::Arc;

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use chirp_backend::Trace;
use chirp_backend::domain::TRACE_ID_HEADER;
use chirp_backend::inbound::http::configure_api;
use chirp_backend::inbound::http::session::SESSION_COOKIE;
use chirp_backend::inbound::http::state::{Adapters, HttpState, HttpStatePorts};
use chirp_backend::outbound::credentials::Argon2CredentialHasher;
use chirp_backend::outbound::memory::InMemoryStore;
use chirp_backend::outbound::session::InMemorySessionStore;

/// Password shared by every account the harness registers.
pub const PASSWORD: &str = "correct-horse-1";

/// Handler state backed entirely by in-memory adapters.
pub fn in_memory_state() -> web::Data<HttpState> {
    let store = Arc::new(InMemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let ports = HttpStatePorts::from_adapters(Adapters {
        users: Arc::clone(&store),
        posts: Arc::clone(&store),
        engagement: store,
        sessions: Arc::new(InMemorySessionStore::new(Arc::clone(&clock))),
        hasher: Arc::new(Argon2CredentialHasher::new()),
        clock,
    });
    web::Data::new(HttpState::new(ports).with_cookie_secure(false))
}

/// Initialise the full `/api` surface over `state`.
pub async fn init(
    state: web::Data<HttpState>,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(Trace)
            .configure(configure_api),
    )
    .await
}

/// Decoded response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub trace_id: Option<String>,
    pub session: Option<Cookie<'static>>,
    pub body: Value,
}

/// Send `req` and decode the response. Empty bodies decode as `null`.
pub async fn send<S>(app: &S, req: Request) -> Reply
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let trace_id = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned);
    let session = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.into_owned());
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    Reply {
        status,
        trace_id,
        session,
        body,
    }
}

/// Register `name` with [`PASSWORD`] and return the login session cookie.
pub async fn sign_up<S>(app: &S, name: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let email = format!("{name}@example.com");
    let created = send(
        app,
        test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({"username": name, "email": email, "password": PASSWORD}))
            .to_request(),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "register {name}");

    let login = send(
        app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({"email": email, "password": PASSWORD}))
            .to_request(),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK, "login {name}");
    login.session.expect("session cookie")
}

/// Publish a post as the owner of `session` and return its id.
pub async fn publish<S>(app: &S, session: &Cookie<'static>, body: Value) -> i64
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let reply = send(
        app,
        test::TestRequest::post()
            .uri("/api/posts")
            .cookie(session.clone())
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["id"].as_i64().expect("post id")
}
