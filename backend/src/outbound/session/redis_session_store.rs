//! Redis-backed `SessionStore` using a `bb8-redis` pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection, RunError};
use bb8_redis::redis::{AsyncCommands, RedisError};
use tracing::debug;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionToken, UserId};

/// Namespace for session keys.
pub const SESSION_KEY_PREFIX: &str = "session:";

/// Stores `session:<token> -> <user id>` with `SET .. EX`.
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisSessionStore {
    /// Build a pool for `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::Connection`] when the URL is invalid or the
    /// pool cannot open its first connection.
    pub async fn connect(redis_url: &str) -> Result<Self, SessionStoreError> {
        let manager = RedisConnectionManager::new(redis_url)
            .map_err(|err| SessionStoreError::connection(err.to_string()))?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(|err| SessionStoreError::connection(err.to_string()))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, SessionStoreError> {
        self.pool.get().await.map_err(map_run_error)
    }
}

fn session_key(token: &SessionToken) -> String {
    format!("{SESSION_KEY_PREFIX}{}", token.as_str())
}

fn map_run_error(error: RunError<RedisError>) -> SessionStoreError {
    match error {
        RunError::User(err) => map_redis_error(err),
        RunError::TimedOut => SessionStoreError::connection("timed out waiting for redis"),
    }
}

fn map_redis_error(error: RedisError) -> SessionStoreError {
    debug!(kind = ?error.kind(), "redis command failed");
    if error.is_io_error() || error.is_connection_refusal() || error.is_connection_dropped() {
        SessionStoreError::connection(error.to_string())
    } else {
        SessionStoreError::query(error.to_string())
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(
        &self,
        token: &SessionToken,
        user: &UserId,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(session_key(token), user.to_string(), ttl.as_secs().max(1))
            .await
            .map_err(map_redis_error)
    }

    async fn get(&self, token: &SessionToken) -> Result<Option<UserId>, SessionStoreError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(session_key(token))
            .await
            .map_err(map_redis_error)?;
        raw.map(|value| {
            UserId::new(&value)
                .map_err(|err| SessionStoreError::query(format!("corrupt session value: {err}")))
        })
        .transpose()
    }

    async fn remove(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(session_key(token))
            .await
            .map_err(map_redis_error)
    }
}
