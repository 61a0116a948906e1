use thiserror::Error;

/// Error type for JWT operations.
///
/// Verification failures are deliberately collapsed into `InvalidToken`;
/// the underlying reason is only logged.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid")]
    InvalidToken,
}

/// Error type for signing secret loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("Signing secret is not configured")]
    Missing,

    #[error("Signing secret is not valid base64: {0}")]
    InvalidEncoding(String),
}
