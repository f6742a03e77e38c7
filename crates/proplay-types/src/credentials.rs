//! Password digests.
//!
//! Passwords are hashed with Argon2id and stored as a PHC string
//! (`$argon2id$v=19$...`). Plaintext never reaches a [`crate::User`]
//! record or a snapshot.

use std::fmt;

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString},
};
use serde::{Deserialize, Serialize};

use crate::{ProplayError, Result};

/// An Argon2id password hash in PHC string form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash `password` under a fresh random salt.
    ///
    /// # Errors
    /// `Internal` if the hasher rejects its input.
    pub fn hash(password: &str) -> Result<Self> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let phc = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| ProplayError::Internal(format!("argon2: {e}")))?;
        Ok(Self(phc.to_string()))
    }

    /// Check a candidate password against this digest.
    ///
    /// A malformed stored value never verifies.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// The stored PHC string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_as_argon2id_phc_string() {
        let d = PasswordDigest::hash("pw").unwrap();
        assert!(d.as_str().starts_with("$argon2id$"), "got {}", d.as_str());
        assert!(!d.as_str().contains("pw$"));
    }

    #[test]
    fn verify_accepts_same_password() {
        let d = PasswordDigest::hash("S3cret!").unwrap();
        assert!(d.verify("S3cret!"));
        assert!(!d.verify("s3cret!"));
        assert!(!d.verify(""));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = PasswordDigest::hash("same").unwrap();
        let b = PasswordDigest::hash("same").unwrap();
        assert_ne!(a, b, "fresh salt per hash");
        assert!(a.verify("same") && b.verify("same"));
    }

    #[test]
    fn malformed_digest_never_verifies() {
        let d: PasswordDigest = serde_json::from_str("\"not-a-digest\"").unwrap();
        assert!(!d.verify("not-a-digest"));
        let d: PasswordDigest = serde_json::from_str("\"$argon2id$v=19$broken\"").unwrap();
        assert!(!d.verify(""));
    }

    #[test]
    fn debug_hides_digest() {
        let d = PasswordDigest::hash("pw").unwrap();
        assert_eq!(format!("{d:?}"), "PasswordDigest(..)");
    }
}
