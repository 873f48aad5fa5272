//! Argon2id implementation of [`CredentialHasher`].

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::domain::PasswordDigest;
use crate::domain::ports::{CredentialHashError, CredentialHasher};

/// Salted Argon2id digests in PHC string format.
#[derive(Default)]
pub struct Argon2CredentialHasher {
    argon2: Argon2<'static>,
}

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, password: &str) -> Result<PasswordDigest, CredentialHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|digest| PasswordDigest::new(digest.to_string()))
            .map_err(|err| CredentialHashError::hash(err.to_string()))
    }

    fn verify(&self, password: &str, digest: &PasswordDigest) -> Result<bool, CredentialHashError> {
        let parsed = PasswordHash::new(digest.as_str())
            .map_err(|err| CredentialHashError::hash(format!("stored digest unreadable: {err}")))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialHashError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn verifies_only_the_original_password() {
        let hasher = Argon2CredentialHasher::new();
        let digest = hasher.hash("correct horse").expect("hash");

        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &digest).expect("verify"));
        assert!(!hasher.verify("battery staple", &digest).expect("verify"));
    }

    #[rstest]
    fn salts_every_digest() {
        let hasher = Argon2CredentialHasher::new();
        let first = hasher.hash("password1").expect("hash");
        let second = hasher.hash("password1").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    fn garbage_digest_is_an_error() {
        let hasher = Argon2CredentialHasher::new();
        let err = hasher
            .verify("password1", &PasswordDigest::new("not-a-phc-string"))
            .expect_err("unparseable digest");
        assert!(matches!(err, CredentialHashError::Hash { .. }));
    }
}
