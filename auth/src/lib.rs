//! Authentication utilities library
//!
//! Provides the credential and session-token primitives used by the chat API:
//! - Password hashing (PBKDF2-HMAC-SHA-256, per-account salt, constant-time compare)
//! - JWT token generation and validation (HS384, registered claims + user id)
//! - Authentication coordination
//!
//! Nothing in this crate performs I/O. Account lookup belongs to the service.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new(1_000);
//! let salt = hasher.new_salt().unwrap();
//! let hash = hasher.hash(b"my_password", &salt);
//! assert!(hasher.verify_password(b"my_password", &salt, &hash, 1_000));
//! ```
//!
//! ## JWT Tokens
//! ```
//! use auth::{Claims, JwtHandler, SigningSecret, REGULAR_AUDIENCE};
//!
//! let secret = SigningSecret::from_bytes(b"secret_key_at_least_32_bytes_long!".to_vec()).unwrap();
//! let handler = JwtHandler::new(&secret);
//! let claims = Claims::for_user("alice", "user-1", REGULAR_AUDIENCE);
//! let token = handler.encode(&claims).unwrap();
//! let decoded = handler.decode(&token).unwrap();
//! assert_eq!(decoded.sub, "alice");
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, Claims, PasswordHasher, SigningSecret, StoredCredentials, REGULAR_AUDIENCE};
//!
//! let secret = SigningSecret::from_base64("c2VjcmV0X2tleV9hdF9sZWFzdF8zMl9ieXRlc19sb25nIQ==").unwrap();
//! let auth = Authenticator::new(&secret, PasswordHasher::new(1_000));
//!
//! // Register: salt and hash password
//! let salt = auth.new_salt().unwrap();
//! let hash = auth.hash_password("password123", &salt);
//!
//! // Login: verify and generate token
//! let credentials = StoredCredentials { hash: &hash, salt: &salt, iterations: 1_000 };
//! let claims = Claims::for_user("alice", "user-1", REGULAR_AUDIENCE);
//! let result = auth.authenticate("password123", &credentials, &claims).unwrap();
//!
//! // Validate token
//! let decoded = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(decoded.uid, "user-1");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use authenticator::StoredCredentials;
pub use authenticator::TOKEN_TYPE;
pub use jwt::claims::ADMIN_AUDIENCE;
pub use jwt::claims::REGULAR_AUDIENCE;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SecretError;
pub use jwt::SigningSecret;
pub use jwt::TokenValidity;
pub use password::PasswordError;
pub use password::PasswordHasher;
