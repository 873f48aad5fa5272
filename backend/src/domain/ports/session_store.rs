//! Port for the key-value session store.
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{SessionToken, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "session store connection failed: {message}",
        /// Command failed or returned an unusable value.
        Query { message: String } => "session store query failed: {message}",
    }
}

/// Token to user-id mapping with expiry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `token -> user` for `ttl`.
    async fn put(
        &self,
        token: &SessionToken,
        user: &UserId,
        ttl: Duration,
    ) -> Result<(), SessionStoreError>;

    /// Resolve a token. Unknown and expired tokens yield `None`.
    async fn get(&self, token: &SessionToken) -> Result<Option<UserId>, SessionStoreError>;

    /// Forget a token. Removing an unknown token succeeds.
    async fn remove(&self, token: &SessionToken) -> Result<(), SessionStoreError>;
}
