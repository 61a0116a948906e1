use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::DisplayNameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Represents a registered account together with its credential record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub display_name: DisplayName,
    pub credentials: PasswordCredentials,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_logged_in: Option<DateTime<Utc>>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Returns
    /// Parsed UserId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 5-50 characters. Any characters are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 5;
    const MAX_LENGTH: usize = 50;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 5 characters
    /// * `TooLong` - Username longer than 50 characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    /// Get username as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Free text shown to other users, 5-150 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    const MIN_LENGTH: usize = 5;
    const MAX_LENGTH: usize = 150;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 5 characters
    /// * `TooLong` - More than 150 characters
    pub fn new(display_name: String) -> Result<Self, DisplayNameError> {
        let length = display_name.chars().count();
        if length < Self::MIN_LENGTH {
            Err(DisplayNameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(DisplayNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(display_name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password as submitted by a client.
///
/// Only printable ASCII is accepted so that the bytes fed to the hasher are
/// the same regardless of client encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;

    /// Create a new password satisfying the policy.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    /// * `NonPrintable` - Contains anything outside printable ASCII
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if !password.chars().all(|c| (' '..='~').contains(&c)) {
            return Err(PasswordPolicyError::NonPrintable);
        }
        if password.len() < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(password))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// Credential record stored on an account.
///
/// The salt is generated once at registration and never rotated; the
/// iteration count records the cost factor the hash was derived with.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordCredentials {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
    pub iterations: u32,
}

impl PasswordCredentials {
    /// Borrow as the credential view expected by the authenticator.
    pub fn as_stored(&self) -> auth::StoredCredentials<'_> {
        auth::StoredCredentials {
            hash: &self.hash,
            salt: &self.salt,
            iterations: self.iterations,
        }
    }
}

impl fmt::Debug for PasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredentials")
            .field("hash", &"[redacted]")
            .field("salt", &"[redacted]")
            .field("iterations", &self.iterations)
            .finish()
    }
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub username: Username,
    pub display_name: DisplayName,
    pub password: Password,
}

impl CreateUserCommand {
    /// Construct a new create user command.
    ///
    /// # Arguments
    /// * `username` - Validated username
    /// * `display_name` - Validated display name
    /// * `password` - Plaintext password (will be salted and hashed by service)
    pub fn new(username: Username, display_name: DisplayName, password: Password) -> Self {
        Self {
            username,
            display_name,
            password,
        }
    }
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub username: Option<Username>,
    pub display_name: Option<DisplayName>,
    pub password: Option<Password>,
}

impl UpdateUserCommand {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.display_name.is_none() && self.password.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_length_bounds() {
        assert!(Username::new("alice".to_string()).is_ok());
        assert_eq!(
            Username::new("bob".to_string()),
            Err(UsernameError::TooShort { min: 5, actual: 3 })
        );
        assert!(matches!(
            Username::new("a".repeat(51)),
            Err(UsernameError::TooLong { max: 50, .. })
        ));
    }

    #[test]
    fn test_username_accepts_any_characters_within_length() {
        assert!(Username::new("alice smith".to_string()).is_ok());
        assert!(Username::new("ünïcødé".to_string()).is_ok());
        assert!(Username::new("a@b#c!".to_string()).is_ok());
        // Length counts characters, not bytes
        assert_eq!(
            Username::new("äöü".to_string()),
            Err(UsernameError::TooShort { min: 5, actual: 3 })
        );
    }

    #[test]
    fn test_display_name_bounds() {
        assert!(DisplayName::new("Alice Liddell".to_string()).is_ok());
        assert!(DisplayName::new("Al".to_string()).is_err());
        assert!(DisplayName::new("x".repeat(151)).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(Password::new("Password123!".to_string()).is_ok());
        assert_eq!(
            Password::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { min: 8 })
        );
        assert_eq!(
            Password::new("pässwörd123".to_string()),
            Err(PasswordPolicyError::NonPrintable)
        );
        assert_eq!(
            Password::new("pass\tword123".to_string()),
            Err(PasswordPolicyError::NonPrintable)
        );
    }

    #[test]
    fn test_secrets_are_redacted_in_debug_output() {
        let password = Password::new("Password123!".to_string()).unwrap();
        assert!(!format!("{:?}", password).contains("Password123!"));

        let credentials = PasswordCredentials {
            hash: vec![0xAB; 64],
            salt: vec![0xCD; 128],
            iterations: 1_000,
        };
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("171"));
    }
}
