//! Identity gate: registration, login, and session resolution.
//!
//! Sessions are opaque random tokens held in a [`SessionStore`] with a fixed
//! [`SESSION_TTL`]. Password hashing runs on the blocking pool so Argon2 work
//! never stalls request workers.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    CredentialHasher, IdentityGate, LoginOutcome, SessionStore, UserProfileQuery, UserRepository,
};
use crate::domain::store_errors::{map_hash_error, map_session_error, map_user_error};
use crate::domain::{
    Error, LoginCredentials, PasswordDigest, Registration, SessionToken, User, UserDraft, UserId,
    Username,
};

/// Lifetime of a session token after login.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const INVALID_LOGIN: &str = "invalid email or password";

// Hashed once and verified against whenever the email is unknown.
const DECOY_PASSWORD: &str = "decoy-password-never-issued";

/// Implements [`IdentityGate`] and [`UserProfileQuery`].
pub struct IdentityService<U, S, H> {
    users: Arc<U>,
    sessions: Arc<S>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
    decoy: Arc<OnceLock<PasswordDigest>>,
}

impl<U, S, H> Clone for IdentityService<U, S, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            sessions: Arc::clone(&self.sessions),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
            decoy: Arc::clone(&self.decoy),
        }
    }
}

impl<U, S, H> IdentityService<U, S, H>
where
    U: UserRepository,
    S: SessionStore,
    H: CredentialHasher + 'static,
{
    pub fn new(users: Arc<U>, sessions: Arc<S>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            sessions,
            hasher,
            clock,
            decoy: Arc::new(OnceLock::new()),
        }
    }

    async fn hash(&self, password: &str) -> Result<PasswordDigest, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = zeroize::Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(password.as_str()))
            .await
            .map_err(|err| Error::internal(format!("credential worker failed: {err}")))?
            .map_err(map_hash_error)
    }

    async fn verify(&self, password: &str, digest: PasswordDigest) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let password = zeroize::Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(password.as_str(), &digest))
            .await
            .map_err(|err| Error::internal(format!("credential worker failed: {err}")))?
            .map_err(map_hash_error)
    }

    /// Unknown emails still pay for one verification, so response timing
    /// does not reveal which addresses are registered.
    async fn verify_decoy(&self, password: &str) -> Result<(), Error> {
        let digest = match self.decoy.get() {
            Some(digest) => digest.clone(),
            None => {
                let fresh = self.hash(DECOY_PASSWORD).await?;
                self.decoy.get_or_init(|| fresh).clone()
            }
        };
        self.verify(password, digest).await.map(|_| ())
    }
}

#[async_trait]
impl<U, S, H> IdentityGate for IdentityService<U, S, H>
where
    U: UserRepository,
    S: SessionStore,
    H: CredentialHasher + 'static,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let digest = self.hash(registration.password()).await?;
        let now = self.clock.utc();
        let user = User::new(UserDraft {
            id: UserId::random(),
            username: registration.username().clone(),
            email: registration.email().clone(),
            bio: String::new(),
            created_at: now,
            updated_at: now,
        });

        self.users
            .insert(&user, &digest)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id(), username = %user.username(), "account registered");
        Ok(user)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let Some((user, digest)) = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            self.verify_decoy(credentials.password()).await?;
            debug!("login for unknown email");
            return Err(Error::unauthorized(INVALID_LOGIN));
        };

        if !self.verify(credentials.password(), digest).await? {
            debug!(user_id = %user.id(), "login with wrong password");
            return Err(Error::unauthorized(INVALID_LOGIN));
        }

        let token = SessionToken::generate();
        self.sessions
            .put(&token, user.id(), SESSION_TTL)
            .await
            .map_err(map_session_error)?;
        info!(user_id = %user.id(), "session opened");
        Ok(LoginOutcome { token, user })
    }

    async fn authenticate(&self, token: &SessionToken) -> Result<UserId, Error> {
        self.sessions
            .get(token)
            .await
            .map_err(map_session_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), Error> {
        self.sessions
            .remove(token)
            .await
            .map_err(map_session_error)
    }
}

#[async_trait]
impl<U, S, H> UserProfileQuery for IdentityService<U, S, H>
where
    U: UserRepository,
    S: SessionStore,
    H: CredentialHasher + 'static,
{
    async fn by_username(&self, username: &Username) -> Result<User, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {username} not found")))
    }

    async fn by_id(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
