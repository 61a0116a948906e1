pub mod claims;
pub mod errors;
pub mod handler;
pub mod secret;

pub use claims::Claims;
pub use claims::TokenValidity;
pub use errors::JwtError;
pub use errors::SecretError;
pub use handler::JwtHandler;
pub use secret::SigningSecret;
