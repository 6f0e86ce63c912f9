use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::warn;

/// Password hashing failed inside the KDF (e.g. entropy or parameter error).
#[derive(Debug, thiserror::Error)]
#[error("Failed to hash password: {0}")]
pub struct HashingError(String);

/// One-way password hashing using Argon2id.
///
/// Hashes are PHC strings (`$argon2id$v=19$m=...`) that embed their salt and
/// cost parameters, so a hash produced with any parameters can be verified by
/// any `CredentialHasher`.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl CredentialHasher {
    /// Argon2id with custom cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashingError(e.to_string()))
    }

    /// Runs the same Argon2 work as [`CredentialHasher::verify`] without a
    /// stored hash, so a login for an unknown account costs as much as one
    /// with a wrong password.
    pub fn verify_dummy(&self, plaintext: &str) {
        if let Err(e) = self.hash(plaintext) {
            warn!(error = %e, "dummy password hash failed");
        }
    }

    /// Checks a password against a stored hash.
    ///
    /// Mismatches and unparsable hashes both return `false`. The comparison is
    /// done by the argon2 crate in constant time.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "stored password hash is not a valid PHC string");
                return false;
            }
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Password checks as seen by the login flow.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHashing: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, HashingError>;

    fn verify(&self, plaintext: &str, hash: &str) -> bool;

    fn verify_dummy(&self, plaintext: &str);
}

impl CredentialHashing for CredentialHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        CredentialHasher::hash(self, plaintext)
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        CredentialHasher::verify(self, plaintext, hash)
    }

    fn verify_dummy(&self, plaintext: &str) {
        CredentialHasher::verify_dummy(self, plaintext)
    }
}
