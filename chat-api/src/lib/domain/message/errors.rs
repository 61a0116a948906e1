use thiserror::Error;

use crate::domain::message::models::MessageId;
use crate::domain::user::errors::UserIdError;
use crate::domain::user::models::UserId;

/// Error type for MessageId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageIdError {
    #[error("must be a positive message id, got {0}")]
    NotPositive(i64),
}

/// Error type for MessageBody validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageBodyError {
    #[error("must not be empty")]
    Empty,

    #[error("must be at most {max} characters")]
    TooLong { max: usize, actual: usize },
}

/// Error type for unrecognised enum values coming from clients or storage
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageKindError {
    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("unknown message status: {0}")]
    UnknownStatus(String),
}

/// Top-level error type for all message-related operations
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Invalid message ID: {0}")]
    InvalidMessageId(#[from] MessageIdError),

    #[error("Invalid message body: {0}")]
    InvalidBody(#[from] MessageBodyError),

    #[error("Invalid message kind: {0}")]
    InvalidKind(#[from] MessageKindError),

    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    // Domain-level errors
    #[error("Recipient not found: {0}")]
    RecipientNotFound(UserId),

    #[error("Attached message not found: {0}")]
    AttachmentNotFound(MessageId),

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),
}
