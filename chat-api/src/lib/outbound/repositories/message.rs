use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::message::errors::MessageError;
use crate::domain::message::models::Message;
use crate::domain::message::models::MessageId;
use crate::domain::message::models::MessageStatus;
use crate::domain::message::models::NewMessage;
use crate::domain::message::ports::MessageRepository;
use crate::domain::user::models::UserId;

const ATTACHMENT_FOREIGN_KEY: &str = "message_type_meta_attach_mssg_id_fkey";

/// PostgreSQL-backed message storage.
///
/// A message spans three tables (meta, type, text) written in one transaction.
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MessageMetaRow {
    mssg_id: i64,
    from_user_id: Uuid,
    to_user_id: Uuid,
    mssg_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn database_error(e: sqlx::Error) -> MessageError {
    MessageError::DatabaseError(e.to_string())
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn create(&self, message: NewMessage) -> Result<Message, MessageError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let meta = sqlx::query_as::<_, MessageMetaRow>(
            r#"
            INSERT INTO message_meta (from_user_id, to_user_id, mssg_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING mssg_id, from_user_id, to_user_id, mssg_status, created_at, updated_at
            "#,
        )
        .bind(message.from_user_id.0)
        .bind(message.to_user_id.0)
        .bind(message.status.as_str())
        .bind(message.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO message_type_meta (mssg_id, mssg_type, attach_mssg_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(meta.mssg_id)
        .bind(message.message_type.as_str())
        .bind(message.attach_message_id.map(|id| id.0))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let (Some(db_err), Some(attachment)) =
                (e.as_database_error(), message.attach_message_id)
            {
                if db_err.is_foreign_key_violation()
                    && db_err.constraint() == Some(ATTACHMENT_FOREIGN_KEY)
                {
                    return MessageError::AttachmentNotFound(attachment);
                }
            }
            database_error(e)
        })?;

        sqlx::query(
            r#"
            INSERT INTO message_text (mssg_id, mssg_body)
            VALUES ($1, $2)
            "#,
        )
        .bind(meta.mssg_id)
        .bind(message.body.as_str())
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        Ok(Message {
            id: MessageId(meta.mssg_id),
            from_user_id: UserId(meta.from_user_id),
            to_user_id: UserId(meta.to_user_id),
            status: meta.mssg_status.parse::<MessageStatus>()?,
            message_type: message.message_type,
            attach_message_id: message.attach_message_id,
            body: message.body,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        })
    }
}
