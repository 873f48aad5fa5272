//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use pagination::DEFAULT_MAX_LIMIT;

use chirp_backend::outbound::persistence::DbPool;
use chirp_backend::outbound::session::RedisSessionStore;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
///
/// Absent backends fall back to in-memory adapters.
pub struct ServerConfig {
    pub(crate) cookie_secure: bool,
    pub(crate) max_page_size: u32,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) sessions: Option<RedisSessionStore>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, cookie_secure: bool) -> Self {
        Self {
            cookie_secure,
            max_page_size: DEFAULT_MAX_LIMIT,
            bind_addr,
            db_pool: None,
            sessions: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Override the ceiling applied to `limit`.
    #[must_use]
    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Attach a database connection pool for the graph and ledger adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Keep sessions in Redis instead of process memory.
    #[must_use]
    pub fn with_session_store(mut self, store: RedisSessionStore) -> Self {
        self.sessions = Some(store);
        self
    }

    /// Use a prepared Prometheus registry. Without one the server builds
    /// its own.
    #[cfg(feature = "metrics")]
    #[must_use]
    pub fn with_metrics(mut self, prometheus: PrometheusMetrics) -> Self {
        self.prometheus = Some(prometheus);
        self
    }
}
