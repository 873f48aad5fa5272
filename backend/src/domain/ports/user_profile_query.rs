//! Driving port for user profile queries.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId, Username};

/// Domain use-case port for reading profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Look up a profile by public handle.
    async fn by_username(&self, username: &Username) -> Result<User, Error>;

    /// Look up a profile by id, typically the caller's own.
    async fn by_id(&self, user_id: &UserId) -> Result<User, Error>;
}
