//! Driving port for registration, login, and session authentication.
//!
//! Inbound adapters call this port to mint and resolve session tokens without
//! knowing which store or hasher backs them.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, Registration, SessionToken, User, UserId};

/// Successful login: the freshly minted token and the account it belongs to.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: SessionToken,
    pub user: User,
}

/// Domain use-case port for identity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityGate: Send + Sync {
    /// Create an account.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Check credentials and open a session.
    ///
    /// Unknown emails and wrong passwords fail identically.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;

    /// Resolve a session token to its user.
    async fn authenticate(&self, token: &SessionToken) -> Result<UserId, Error>;

    /// Close a session. Unknown tokens are ignored.
    async fn logout(&self, token: &SessionToken) -> Result<(), Error>;
}
