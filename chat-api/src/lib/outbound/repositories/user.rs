use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::DisplayName;
use crate::domain::user::models::PasswordCredentials;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USERNAME_UNIQUE_CONSTRAINT: &str = "users_username_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    display_name: String,
    password_hash: Vec<u8>,
    password_salt: Vec<u8>,
    password_iterations: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_logged_in: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let iterations = u32::try_from(row.password_iterations).map_err(|_| {
            UserError::DatabaseError(format!(
                "stored iteration count {} for user {} is out of range",
                row.password_iterations, row.id
            ))
        })?;

        Ok(User {
            id: UserId(row.id),
            username: Username::new(row.username)?,
            display_name: DisplayName::new(row.display_name)?,
            credentials: PasswordCredentials {
                hash: row.password_hash,
                salt: row.password_salt,
                iterations,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_logged_in: row.last_logged_in,
        })
    }
}

fn iterations_column(credentials: &PasswordCredentials) -> Result<i32, UserError> {
    i32::try_from(credentials.iterations).map_err(|_| {
        UserError::DatabaseError(format!(
            "iteration count {} does not fit the storage column",
            credentials.iterations
        ))
    })
}

fn map_write_error(e: sqlx::Error, username: &Username) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(USERNAME_UNIQUE_CONSTRAINT)
        {
            return UserError::UsernameAlreadyExists(username.as_str().to_string());
        }
    }
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, display_name, password_hash, password_salt,
                password_iterations, created_at, updated_at, last_logged_in
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.display_name.as_str())
        .bind(&user.credentials.hash)
        .bind(&user.credentials.salt)
        .bind(iterations_column(&user.credentials)?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_logged_in)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.username))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, display_name, password_hash, password_salt,
                   password_iterations, created_at, updated_at, last_logged_in
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, display_name, password_hash, password_salt,
                   password_iterations, created_at, updated_at, last_logged_in
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_username_and_id(
        &self,
        username: &Username,
        id: &UserId,
    ) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, display_name, password_hash, password_salt,
                   password_iterations, created_at, updated_at, last_logged_in
            FROM users
            WHERE username = $1 AND id = $2
            "#,
        )
        .bind(username.as_str())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(User::try_from).transpose()
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, display_name = $3, password_hash = $4,
                password_iterations = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.username.as_str())
        .bind(user.display_name.as_str())
        .bind(&user.credentials.hash)
        .bind(iterations_column(&user.credentials)?)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.username))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.id.to_string()));
        }

        Ok(user)
    }

    async fn touch_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_logged_in = $2
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn update_credentials(
        &self,
        id: &UserId,
        current: &PasswordCredentials,
        replacement: &PasswordCredentials,
    ) -> Result<bool, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, password_iterations = $3
            WHERE id = $1 AND password_hash = $4 AND password_iterations = $5
            "#,
        )
        .bind(id.0)
        .bind(&replacement.hash)
        .bind(iterations_column(replacement)?)
        .bind(&current.hash)
        .bind(iterations_column(current)?)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}
