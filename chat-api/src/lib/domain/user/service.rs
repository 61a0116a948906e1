use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::Password;
use crate::domain::user::models::PasswordCredentials;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Also acts as the identity resolver for the authentication gate.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher carrying the configured cost factor
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, password_hasher: auth::PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    /// Derive credentials on the blocking pool.
    async fn derive_credentials(
        &self,
        password: &Password,
        salt: Vec<u8>,
    ) -> Result<PasswordCredentials, UserError> {
        let hasher = self.password_hasher;
        let password = password.clone();

        tokio::task::spawn_blocking(move || PasswordCredentials {
            hash: hasher.hash(password.as_str().as_bytes(), &salt),
            salt,
            iterations: hasher.iterations(),
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))
    }

    /// Re-derive the hash at the configured cost with the same salt.
    ///
    /// The write only lands if the stored credentials still equal the ones
    /// the login was verified against. Failures never block the login.
    async fn rehash(&self, user: &User, password: &Password) {
        let credentials = match self
            .derive_credentials(password, user.credentials.salt.clone())
            .await
        {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to re-derive password hash");
                return;
            }
        };

        match self
            .repository
            .update_credentials(&user.id, &user.credentials, &credentials)
            .await
        {
            Ok(true) => tracing::info!(
                user_id = %user.id,
                previous_iterations = user.credentials.iterations,
                iterations = credentials.iterations,
                "Password hash re-derived at configured cost"
            ),
            Ok(false) => tracing::info!(
                user_id = %user.id,
                "Credentials changed since login was verified; skipping re-derivation"
            ),
            Err(e) => tracing::warn!(
                user_id = %user.id,
                error = %e,
                "Failed to store re-derived password hash; keeping previous cost"
            ),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let salt = self.password_hasher.new_salt()?;
        let credentials = self.derive_credentials(&command.password, salt).await?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            username: command.username,
            display_name: command.display_name,
            credentials,
            created_at: now,
            updated_at: now,
            last_logged_in: None,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(
            user_id = %created_user.id,
            username = %created_user.username,
            "User registered"
        );

        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_username(&self, username: &Username) -> Result<User, UserError> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::NotFoundByUsername(username.to_string()))
    }

    async fn resolve_identity(&self, username: &Username, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_username_and_id(username, id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn record_login(&self, user: &User, password: &Password) -> Result<(), UserError> {
        if self.password_hasher.needs_rehash(user.credentials.iterations) {
            self.rehash(user, password).await;
        }

        self.repository.touch_last_login(&user.id, Utc::now()).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if command.is_empty() {
            return Ok(user);
        }

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_display_name) = command.display_name {
            user.display_name = new_display_name;
        }

        if let Some(new_password) = command.password {
            let salt = std::mem::take(&mut user.credentials.salt);
            user.credentials = self.derive_credentials(&new_password, salt).await?;
        }

        user.updated_at = Utc::now();

        let updated_user = self.repository.update(user).await?;
        tracing::info!(user_id = %updated_user.id, "User updated");

        Ok(updated_user)
    }
}
