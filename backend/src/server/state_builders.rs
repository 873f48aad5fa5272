//! Builders that pick driven adapters and assemble HTTP state from them.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use chirp_backend::domain::ports::SessionStore;
use chirp_backend::inbound::http::state::{Adapters, HttpState, HttpStatePorts};
use chirp_backend::outbound::credentials::Argon2CredentialHasher;
use chirp_backend::outbound::memory::InMemoryStore;
use chirp_backend::outbound::persistence::{
    DbPool, DieselEngagementRepository, DieselPostRepository, DieselUserRepository,
};
use chirp_backend::outbound::session::InMemorySessionStore;

use super::ServerConfig;

/// Wire the graph, ledger, and account adapters around a chosen session store.
fn ports_with_sessions<S>(
    pool: Option<&DbPool>,
    sessions: Arc<S>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts
where
    S: SessionStore + 'static,
{
    let hasher = Arc::new(Argon2CredentialHasher::new());
    match pool {
        Some(pool) => {
            info!("using PostgreSQL for users, posts, and engagement");
            HttpStatePorts::from_adapters(Adapters {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                posts: Arc::new(DieselPostRepository::new(pool.clone())),
                engagement: Arc::new(DieselEngagementRepository::new(pool.clone())),
                sessions,
                hasher,
                clock,
            })
        }
        None => {
            warn!("no database configured; all data is kept in process memory");
            let store = Arc::new(InMemoryStore::new());
            HttpStatePorts::from_adapters(Adapters {
                users: Arc::clone(&store),
                posts: Arc::clone(&store),
                engagement: store,
                sessions,
                hasher,
                clock,
            })
        }
    }
}

/// Build the shared handler state from server configuration.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let pool = config.db_pool.as_ref();
    let ports = match &config.sessions {
        Some(redis) => {
            info!("using Redis for sessions");
            ports_with_sessions(pool, Arc::new(redis.clone()), clock)
        }
        None => {
            warn!("no Redis configured; sessions do not survive a restart");
            let sessions = Arc::new(InMemorySessionStore::new(Arc::clone(&clock)));
            ports_with_sessions(pool, sessions, clock)
        }
    };
    web::Data::new(
        HttpState::new(ports)
            .with_max_page_size(config.max_page_size)
            .with_cookie_secure(config.cookie_secure),
    )
}
