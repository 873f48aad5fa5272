//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{PasswordDigest, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this username.
        DuplicateUsername { username: String } => "username {username} is already taken",
        /// Another account already uses this email.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Port for account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account together with its credential hash.
    ///
    /// Fails with a duplicate variant when the username or email is taken.
    async fn insert(
        &self,
        user: &User,
        password: &PasswordDigest,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by public handle.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user and their credential hash by normalised email.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(User, PasswordDigest)>, UserPersistenceError>;

    /// Fetch every user in `ids` that exists, in no particular order.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;
}
