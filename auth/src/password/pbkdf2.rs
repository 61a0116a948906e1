use ::pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::PasswordError;

/// Length in bytes of a derived password hash.
pub const HASH_LENGTH: usize = 64;

/// Length in bytes of a per-account salt.
pub const SALT_LENGTH: usize = 128;

/// Iteration count applied to newly derived hashes unless configured otherwise.
pub const DEFAULT_ITERATIONS: u32 = 600_000;

/// Password hashing implementation.
///
/// Derives hashes with PBKDF2 (HMAC-SHA-256 inner primitive). The salt is
/// supplied by the caller and stored next to the account; the iteration count
/// is the configured cost factor for new hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    /// Create a new password hasher.
    ///
    /// # Arguments
    /// * `iterations` - PBKDF2 cost factor used for new hashes (clamped to at least 1)
    ///
    /// # Returns
    /// PasswordHasher instance
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Configured cost factor for new hashes.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash a plaintext password with the configured iteration count.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    /// * `salt` - Per-account salt
    ///
    /// # Returns
    /// 64-byte derived hash
    pub fn hash(&self, password: &[u8], salt: &[u8]) -> Vec<u8> {
        Self::hash_with_iterations(password, salt, self.iterations)
    }

    /// Hash a plaintext password with an explicit iteration count.
    ///
    /// Used when verifying against an account that was hashed under a
    /// different cost factor.
    pub fn hash_with_iterations(password: &[u8], salt: &[u8], iterations: u32) -> Vec<u8> {
        let mut output = vec![0u8; HASH_LENGTH];
        pbkdf2_hmac::<Sha256>(password, salt, iterations.max(1), &mut output);
        output
    }

    /// Generate a fresh random salt.
    ///
    /// # Returns
    /// 128 random bytes from the operating system CSPRNG
    ///
    /// # Errors
    /// * `EntropyUnavailable` - The OS random source failed
    pub fn new_salt(&self) -> Result<Vec<u8>, PasswordError> {
        let mut salt = vec![0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| PasswordError::EntropyUnavailable(e.to_string()))?;
        Ok(salt)
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `salt` - Salt stored with the account
    /// * `stored_hash` - Hash stored with the account
    /// * `iterations` - Iteration count the stored hash was derived with
    ///
    /// # Returns
    /// True if password matches, false otherwise
    pub fn verify_password(
        &self,
        password: &[u8],
        salt: &[u8],
        stored_hash: &[u8],
        iterations: u32,
    ) -> bool {
        let candidate = Self::hash_with_iterations(password, salt, iterations);
        Self::verify(&candidate, stored_hash)
    }

    /// Compare two hashes in constant time.
    ///
    /// Inputs of unequal length never match; only the length mismatch itself
    /// is observable.
    pub fn verify(candidate_hash: &[u8], stored_hash: &[u8]) -> bool {
        candidate_hash.ct_eq(stored_hash).into()
    }

    /// Whether a hash derived with `iterations` should be recomputed under the
    /// configured cost factor.
    pub fn needs_rehash(&self, iterations: u32) -> bool {
        iterations != self.iterations
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}
