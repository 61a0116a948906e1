use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SigningSecret;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Scheme name returned to clients alongside issued tokens.
pub const TOKEN_TYPE: &str = "Bearer";

/// Authentication coordinator combining password verification and JWT generation.
///
/// Holds the only copy of the signing secret. Immutable after construction,
/// so a single instance is shared across all requests.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

/// Credential material stored on an account.
#[derive(Debug, Clone, Copy)]
pub struct StoredCredentials<'a> {
    pub hash: &'a [u8],
    pub salt: &'a [u8],
    pub iterations: u32,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// JWT access token
    pub access_token: String,
    /// Always [`TOKEN_TYPE`]
    pub token_type: &'static str,
    /// Expiry of the access token (Unix timestamp)
    pub expires_at: i64,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `secret` - Process signing secret
    /// * `password_hasher` - Hasher configured with the current cost factor
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(secret: &SigningSecret, password_hasher: PasswordHasher) -> Self {
        Self {
            password_hasher,
            jwt_handler: JwtHandler::new(secret),
        }
    }

    /// Generate a salt for a new account.
    ///
    /// # Errors
    /// * `EntropyUnavailable` - The OS random source failed
    pub fn new_salt(&self) -> Result<Vec<u8>, PasswordError> {
        self.password_hasher.new_salt()
    }

    /// Hash a password for storage under the configured cost factor.
    pub fn hash_password(&self, password: &str, salt: &[u8]) -> Vec<u8> {
        self.password_hasher.hash(password.as_bytes(), salt)
    }

    /// Verify credentials and generate JWT token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `credentials` - Hash, salt and cost factor stored on the account
    /// * `claims` - JWT claims to encode in token
    ///
    /// # Returns
    /// AuthenticationResult with access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        credentials: &StoredCredentials<'_>,
        claims: &Claims,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let is_valid = self.password_hasher.verify_password(
            password.as_bytes(),
            credentials.salt,
            credentials.hash,
            credentials.iterations,
        );

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        let access_token = self.jwt_handler.encode(claims)?;

        Ok(AuthenticationResult {
            access_token,
            token_type: TOKEN_TYPE,
            expires_at: claims.exp,
        })
    }

    /// Generate JWT token without password verification.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn generate_token(&self, claims: &Claims) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Validate and decode JWT token.
    ///
    /// # Errors
    /// * `InvalidToken` - Token failed any signature or claim check
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}
