use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Serialize;

use super::claims::Claims;
use super::claims::TokenValidity;
use super::claims::LEEWAY_SECONDS;
use super::claims::TOKEN_ISSUER;
use super::claims::USER_ROLE;
use super::errors::JwtError;
use super::secret::SigningSecret;

/// JWT token handler for encoding and decoding tokens.
///
/// Signs with HS384 and accepts nothing else on the way in.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler from the process signing secret.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    ///
    /// # Returns
    /// JwtHandler instance configured with HS384 and the service's claim rules
    pub fn new(secret: &SigningSecret) -> Self {
        let algorithm = Algorithm::HS384;

        let mut validation = Validation::new(algorithm);
        validation.algorithms = vec![algorithm];
        validation.leeway = LEEWAY_SECONDS;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_audience(&[USER_ROLE]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            validation,
        }
    }

    /// Encode claims into a JWT token.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode (must implement Serialize)
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// Checks, in order: algorithm allow-list, signature, issuer, audience,
    /// expiry, then not-before and issued-at against the current time.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidToken` - Any check failed
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::warn!(reason = ?e.kind(), "Invalid token encountered");
                JwtError::InvalidToken
            })?;

        let claims = token_data.claims;
        let now = Utc::now().timestamp();

        match claims.validity_at(now, self.validation.leeway) {
            TokenValidity::Valid if claims.iat <= claims.exp => Ok(claims),
            validity => {
                tracing::warn!(
                    ?validity,
                    iat = claims.iat,
                    nbf = claims.nbf,
                    exp = claims.exp,
                    "Invalid token encountered"
                );
                Err(JwtError::InvalidToken)
            }
        }
    }
}
