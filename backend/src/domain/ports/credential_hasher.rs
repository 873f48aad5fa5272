//! Port for password hashing.
use crate::domain::PasswordDigest;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHashError {
        /// Hashing or digest parsing failed.
        Hash { message: String } => "credential hashing failed: {message}",
    }
}

/// Hashes and verifies passwords.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Produce a salted digest for storage.
    fn hash(&self, password: &str) -> Result<PasswordDigest, CredentialHashError>;

    /// Check a password against a stored digest.
    fn verify(&self, password: &str, digest: &PasswordDigest) -> Result<bool, CredentialHashError>;
}
