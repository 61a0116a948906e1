pub mod errors;
pub mod pbkdf2;

pub use errors::PasswordError;
pub use pbkdf2::PasswordHasher;
pub use pbkdf2::DEFAULT_ITERATIONS;
pub use pbkdf2::HASH_LENGTH;
pub use pbkdf2::SALT_LENGTH;
