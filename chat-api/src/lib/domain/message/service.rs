use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::models::Message;
use super::models::MessageStatus;
use super::models::NewMessage;
use super::models::SendMessageCommand;
use super::ports::MessageRepository;
use super::ports::MessageServicePort;
use crate::domain::message::errors::MessageError;
use crate::domain::user::ports::UserRepository;

/// Concrete implementation of MessageServicePort.
///
/// Validates the recipient and stores the message with `sent` status.
pub struct MessageService<MR, UR>
where
    MR: MessageRepository,
    UR: UserRepository,
{
    message_repository: Arc<MR>,
    user_repository: Arc<UR>,
}

impl<MR, UR> MessageService<MR, UR>
where
    MR: MessageRepository,
    UR: UserRepository,
{
    /// Create a new message service with injected dependencies.
    ///
    /// # Arguments
    /// * `message_repository` - Message persistence implementation
    /// * `user_repository` - User repository for recipient validation
    pub fn new(message_repository: Arc<MR>, user_repository: Arc<UR>) -> Self {
        Self {
            message_repository,
            user_repository,
        }
    }
}

#[async_trait]
impl<MR, UR> MessageServicePort for MessageService<MR, UR>
where
    MR: MessageRepository + 'static,
    UR: UserRepository + 'static,
{
    async fn send_message(&self, command: SendMessageCommand) -> Result<Message, MessageError> {
        // Verify recipient exists
        self.user_repository
            .find_by_id(&command.to_user_id)
            .await
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?
            .ok_or(MessageError::RecipientNotFound(command.to_user_id))?;

        let message = NewMessage {
            from_user_id: command.from_user_id,
            to_user_id: command.to_user_id,
            status: MessageStatus::Sent,
            message_type: command.message_type,
            attach_message_id: command.attach_message_id,
            body: command.body,
            created_at: Utc::now(),
        };

        let saved_message = self.message_repository.create(message).await?;
        tracing::debug!(
            message_id = %saved_message.id,
            from_user_id = %saved_message.from_user_id,
            to_user_id = %saved_message.to_user_id,
            message_type = saved_message.message_type.as_str(),
            "Message stored"
        );

        Ok(saved_message)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::DateTime;
    use mockall::mock;

    use super::*;
    use crate::domain::message::models::MessageBody;
    use crate::domain::message::models::MessageId;
    use crate::domain::message::models::MessageType;
    use crate::domain::user::errors::UserError;
    use crate::domain::user::models::DisplayName;
    use crate::domain::user::models::PasswordCredentials;
    use crate::domain::user::models::User;
    use crate::domain::user::models::UserId;
    use crate::domain::user::models::Username;

    mock! {
        pub TestMessageRepository {}

        #[async_trait]
        impl MessageRepository for TestMessageRepository {
            async fn create(&self, message: NewMessage) -> Result<Message, MessageError>;
        }
    }

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_by_username_and_id(&self, username: &Username, id: &UserId) -> Result<Option<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn touch_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError>;
            async fn update_credentials(&self, id: &UserId, current: &PasswordCredentials, replacement: &PasswordCredentials) -> Result<bool, UserError>;
        }
    }

    fn recipient(id: UserId) -> User {
        let now = Utc::now();
        User {
            id,
            username: Username::new("recipient".to_string()).unwrap(),
            display_name: DisplayName::new("Recipient".to_string()).unwrap(),
            credentials: PasswordCredentials {
                hash: vec![0; 64],
                salt: vec![0; 128],
                iterations: 1_000,
            },
            created_at: now,
            updated_at: now,
            last_logged_in: None,
        }
    }

    fn command(from: UserId, to: UserId) -> SendMessageCommand {
        SendMessageCommand {
            from_user_id: from,
            to_user_id: to,
            message_type: MessageType::Reply,
            attach_message_id: Some(MessageId(7)),
            body: MessageBody::new("see you at noon".to_string()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_send_message_success() {
        let mut message_repository = MockTestMessageRepository::new();
        let mut user_repository = MockTestUserRepository::new();

        let sender = UserId::new();
        let target = UserId::new();

        user_repository
            .expect_find_by_id()
            .withf(move |id| *id == target)
            .times(1)
            .returning(move |id| Ok(Some(recipient(*id))));

        message_repository
            .expect_create()
            .withf(move |message| {
                message.from_user_id == sender
                    && message.to_user_id == target
                    && message.status == MessageStatus::Sent
                    && message.attach_message_id == Some(MessageId(7))
            })
            .times(1)
            .returning(|message| {
                Ok(Message {
                    id: MessageId(1),
                    from_user_id: message.from_user_id,
                    to_user_id: message.to_user_id,
                    status: message.status,
                    message_type: message.message_type,
                    attach_message_id: message.attach_message_id,
                    body: message.body,
                    created_at: message.created_at,
                    updated_at: message.created_at,
                })
            });

        let service = MessageService::new(Arc::new(message_repository), Arc::new(user_repository));

        let message = service
            .send_message(command(sender, target))
            .await
            .unwrap();
        assert_eq!(message.id, MessageId(1));
        assert_eq!(message.message_type, MessageType::Reply);
        assert_eq!(message.body.as_str(), "see you at noon");
    }

    #[tokio::test]
    async fn test_send_message_unknown_recipient() {
        let mut message_repository = MockTestMessageRepository::new();
        let mut user_repository = MockTestUserRepository::new();

        user_repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        message_repository.expect_create().times(0);

        let service = MessageService::new(Arc::new(message_repository), Arc::new(user_repository));

        let result = service
            .send_message(command(UserId::new(), UserId::new()))
            .await;
        assert!(matches!(
            result.unwrap_err(),
            MessageError::RecipientNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_send_message_recipient_lookup_failure() {
        let message_repository = MockTestMessageRepository::new();
        let mut user_repository = MockTestUserRepository::new();

        user_repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Err(UserError::DatabaseError("pool timed out".to_string())));

        let service = MessageService::new(Arc::new(message_repository), Arc::new(user_repository));

        let result = service
            .send_message(command(UserId::new(), UserId::new()))
            .await;
        assert!(matches!(result.unwrap_err(), MessageError::DatabaseError(_)));
    }
}
