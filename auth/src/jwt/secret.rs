use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::errors::SecretError;

/// Process-wide HMAC signing secret.
///
/// Decoded once at startup and handed to the token handler; never read from
/// ambient state.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Decode a base64 (standard alphabet, padded) secret.
    ///
    /// # Errors
    /// * `Missing` - Value is empty or decodes to zero bytes
    /// * `InvalidEncoding` - Value is not valid base64
    pub fn from_base64(encoded: &str) -> Result<Self, SecretError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(SecretError::Missing);
        }

        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| SecretError::InvalidEncoding(e.to_string()))?;

        Self::from_bytes(bytes)
    }

    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SecretError::Missing);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([REDACTED; {} bytes])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base64() {
        let secret = SigningSecret::from_base64("c2VjcmV0X2tleV9hdF9sZWFzdF8zMl9ieXRlc19sb25nIQ==")
            .expect("Failed to decode secret");
        assert_eq!(secret.as_bytes(), b"secret_key_at_least_32_bytes_long!");
    }

    #[test]
    fn test_from_base64_rejects_malformed() {
        let result = SigningSecret::from_base64("not base64 at all!");
        assert!(matches!(result, Err(SecretError::InvalidEncoding(_))));
    }

    #[test]
    fn test_from_base64_rejects_empty() {
        assert_eq!(SigningSecret::from_base64("  "), Err(SecretError::Missing));
        assert_eq!(SigningSecret::from_bytes(Vec::new()), Err(SecretError::Missing));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let secret = SigningSecret::from_bytes(b"super-secret".to_vec()).unwrap();
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("REDACTED"));
    }
}
