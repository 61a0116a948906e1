use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::PasswordCredentials;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Create new user with freshly salted and hashed credentials.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, display name and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `Password` - No salt could be generated
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by unique username.
    ///
    /// # Errors
    /// * `NotFoundByUsername` - No user with this username
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError>;

    /// Resolve the identity carried by a verified token.
    ///
    /// The account must match on both username and id, so a token issued
    /// before a rename no longer resolves.
    ///
    /// # Arguments
    /// * `username` - Token subject
    /// * `id` - Token user id
    ///
    /// # Returns
    /// Current user entity
    ///
    /// # Errors
    /// * `NotFound` - No account matches both keys
    /// * `DatabaseError` - Database operation failed
    async fn resolve_identity(&self, username: &Username, id: &UserId) -> Result<User, UserError>;

    /// Record a successful login.
    ///
    /// Stamps the last-login time and, when the account's hash was derived
    /// under a different cost factor than the configured one, re-derives it
    /// with the same salt at the configured cost. The re-derived hash is not
    /// stored if the credentials changed after `user` was read.
    ///
    /// # Arguments
    /// * `user` - Account whose password was just verified
    /// * `password` - The verified plaintext password
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn record_login(&self, user: &User, password: &Password) -> Result<(), UserError>;

    /// Update existing user with optional fields.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `command` - Command with optional username, display name and password fields
    ///
    /// # Returns
    /// Updated user entity
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve user matching both username and identifier.
    ///
    /// # Returns
    /// Optional user entity (None unless both keys match the same row)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username_and_id(
        &self,
        username: &Username,
        id: &UserId,
    ) -> Result<Option<User>, UserError>;

    /// Update profile and credential fields of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Set the last-login timestamp.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn touch_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError>;

    /// Replace the stored hash and iteration count, provided they still equal
    /// `current`. The salt is never changed.
    ///
    /// # Returns
    /// `true` if the row was updated, `false` if the account is gone or its
    /// credentials no longer match `current`
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_credentials(
        &self,
        id: &UserId,
        current: &PasswordCredentials,
        replacement: &PasswordCredentials,
    ) -> Result<bool, UserError>;
}
