//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{test as actix_test, web};
use serde_json::Value;

use crate::domain::UserId;
use crate::domain::ports::{
    MockEngagementCommand, MockIdentityGate, MockPostCommand, MockTimelineQuery,
    MockUserProfileQuery,
};
use crate::inbound::http::session::SESSION_COOKIE;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Token accepted by [`MockPorts::signed_in`].
pub const TEST_TOKEN: &str = "test-session";

/// Mock port set with every expectation empty.
#[derive(Default)]
pub struct MockPorts {
    pub identity: MockIdentityGate,
    pub profiles: MockUserProfileQuery,
    pub posts: MockPostCommand,
    pub engagement: MockEngagementCommand,
    pub feeds: MockTimelineQuery,
}

impl MockPorts {
    /// Ports whose identity gate resolves [`TEST_TOKEN`] to `viewer`.
    pub fn signed_in(viewer: UserId) -> Self {
        let mut ports = Self::default();
        ports
            .identity
            .expect_authenticate()
            .withf(|token| token.as_str() == TEST_TOKEN)
            .returning(move |_| Ok(viewer.clone()));
        ports
    }

    /// Wrap the mocks as handler state with insecure cookies.
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(
            HttpState::new(HttpStatePorts {
                identity: Arc::new(self.identity),
                profiles: Arc::new(self.profiles),
                posts: Arc::new(self.posts),
                engagement: Arc::new(self.engagement),
                feeds: Arc::new(self.feeds),
            })
            .with_cookie_secure(false),
        )
    }
}

/// Session cookie carrying [`TEST_TOKEN`].
pub fn session() -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, TEST_TOKEN)
}

/// Decode a response body as JSON.
pub async fn body_json(res: ServiceResponse) -> Value {
    let bytes = actix_test::read_body(res).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}
