//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;
use pagination::{DEFAULT_MAX_LIMIT, PageRequest, PaginationError};
use serde_json::json;

use crate::domain::ports::{
    CredentialHasher, EngagementCommand, EngagementRepository, IdentityGate, PostCommand,
    PostRepository, SessionStore, TimelineQuery, UserProfileQuery, UserRepository,
};
use crate::domain::{EngagementService, Error, FeedService, IdentityService, PostService};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub identity: Arc<dyn IdentityGate>,
    pub profiles: Arc<dyn UserProfileQuery>,
    pub posts: Arc<dyn PostCommand>,
    pub engagement: Arc<dyn EngagementCommand>,
    pub feeds: Arc<dyn TimelineQuery>,
}

/// Driven adapters the domain services are assembled from.
pub struct Adapters<U, P, E, S, H> {
    pub users: Arc<U>,
    pub posts: Arc<P>,
    pub engagement: Arc<E>,
    pub sessions: Arc<S>,
    pub hasher: Arc<H>,
    pub clock: Arc<dyn Clock>,
}

impl HttpStatePorts {
    /// Build every domain service over one set of driven adapters.
    pub fn from_adapters<U, P, E, S, H>(adapters: Adapters<U, P, E, S, H>) -> Self
    where
        U: UserRepository + 'static,
        P: PostRepository + 'static,
        E: EngagementRepository + 'static,
        S: SessionStore + 'static,
        H: CredentialHasher + 'static,
    {
        let Adapters {
            users,
            posts,
            engagement,
            sessions,
            hasher,
            clock,
        } = adapters;
        let identity = Arc::new(IdentityService::new(
            Arc::clone(&users),
            sessions,
            hasher,
            Arc::clone(&clock),
        ));
        let publishing = PostService::new(
            Arc::clone(&posts),
            Arc::clone(&engagement),
            Arc::clone(&users),
            Arc::clone(&clock),
        );
        let ledger = EngagementService::new(Arc::clone(&posts), Arc::clone(&engagement), clock);
        let feeds = FeedService::new(posts, engagement, users);
        Self {
            identity: identity.clone(),
            profiles: identity,
            posts: Arc::new(publishing),
            engagement: Arc::new(ledger),
            feeds: Arc::new(feeds),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityGate>,
    pub profiles: Arc<dyn UserProfileQuery>,
    pub posts: Arc<dyn PostCommand>,
    pub engagement: Arc<dyn EngagementCommand>,
    pub feeds: Arc<dyn TimelineQuery>,
    /// Upper bound applied to every `limit` query parameter.
    pub max_page_size: u32,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state with the default page ceiling and secure cookies.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            identity,
            profiles,
            posts,
            engagement,
            feeds,
        } = ports;
        Self {
            identity,
            profiles,
            posts,
            engagement,
            feeds,
            max_page_size: DEFAULT_MAX_LIMIT,
            cookie_secure: true,
        }
    }

    #[must_use]
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, cookie_secure: bool) -> Self {
        self.cookie_secure = cookie_secure;
        self
    }

    /// Validate raw `limit`/`offset` values against the configured ceiling.
    pub fn page_request(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<PageRequest, Error> {
        PageRequest::new(limit, offset, self.max_page_size).map_err(map_pagination_error)
    }
}

fn map_pagination_error(error: PaginationError) -> Error {
    let field = match error {
        PaginationError::NegativeLimit { .. } => "limit",
        PaginationError::NegativeOffset { .. } => "offset",
        PaginationError::ZeroMaximum => {
            return Error::internal("maximum page size is misconfigured");
        }
    };
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": field, "code": "negative_value" }))
}
