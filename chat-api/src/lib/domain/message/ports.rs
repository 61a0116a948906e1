use async_trait::async_trait;

use crate::domain::message::errors::MessageError;
use crate::domain::message::models::Message;
use crate::domain::message::models::NewMessage;
use crate::domain::message::models::SendMessageCommand;

/// Port for message domain service operations.
#[async_trait]
pub trait MessageServicePort: Send + Sync + 'static {
    /// Send a direct message to another user.
    ///
    /// # Arguments
    /// * `command` - Validated sender, recipient, type, optional attachment and body
    ///
    /// # Returns
    /// Stored message with its assigned id and `sent` status
    ///
    /// # Errors
    /// * `RecipientNotFound` - Target user does not exist
    /// * `AttachmentNotFound` - Attached message does not exist
    /// * `DatabaseError` - Database operation failed
    async fn send_message(&self, command: SendMessageCommand) -> Result<Message, MessageError>;
}

/// Persistence operations for messages.
#[async_trait]
pub trait MessageRepository: Send + Sync + 'static {
    /// Persist a new message atomically.
    ///
    /// # Arguments
    /// * `message` - Message without id
    ///
    /// # Returns
    /// Stored message including the storage-assigned id
    ///
    /// # Errors
    /// * `AttachmentNotFound` - Attached message id does not reference a stored message
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, message: NewMessage) -> Result<Message, MessageError>;
}
