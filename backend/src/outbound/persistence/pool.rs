//! Shared bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! Repositories hold a cloned [`DbPool`] and turn [`PoolError`] into their
//! port's `Connection` variant, which the services report as
//! `service_unavailable`.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

const DEFAULT_MAX_SIZE: u32 = 10;
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Pool construction or checkout failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("no database connection available: {message}")]
    Checkout { message: String },
    #[error("database pool could not start: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Where to connect and how many connections to keep.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
}

impl PoolConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
        }
    }

    /// Upper bound on open connections. Zero is raised to one.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    fn min_idle(&self) -> u32 {
        (self.max_size / 4).max(1)
    }
}

/// Cloneable handle to the connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool and its idle connections.
    ///
    /// # Errors
    ///
    /// [`PoolError::Build`] when the URL is rejected or PostgreSQL is
    /// unreachable.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url());
        Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(config.min_idle()))
            .connection_timeout(CHECKOUT_TIMEOUT)
            .build(manager)
            .await
            .map(|inner| Self { inner })
            .map_err(|err| PoolError::build(err.to_string()))
    }

    /// Borrow a connection, waiting up to five seconds.
    ///
    /// # Errors
    ///
    /// [`PoolError::Checkout`] when every connection stays busy.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(None, 10, 2)]
    #[case(Some(40), 40, 10)]
    #[case(Some(2), 2, 1)]
    #[case(Some(0), 1, 1)]
    fn sizing(#[case] requested: Option<u32>, #[case] max: u32, #[case] idle: u32) {
        let base = PoolConfig::new("postgres://localhost/chirp");
        let config = match requested {
            Some(size) => base.with_max_size(size),
            None => base,
        };
        assert_eq!((config.max_size, config.min_idle()), (max, idle));
    }

    #[rstest]
    fn errors_keep_the_driver_message() {
        let err = PoolError::checkout("timed out waiting for connection");
        assert!(err.to_string().ends_with("timed out waiting for connection"));
    }
}
