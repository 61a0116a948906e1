use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::domain::message::errors::MessageBodyError;
use crate::domain::message::errors::MessageIdError;
use crate::domain::message::errors::MessageKindError;
use crate::domain::user::models::UserId;

/// Message aggregate root entity.
///
/// A direct message from one user to another. Persisted across the meta,
/// type and text tables in a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub status: MessageStatus,
    pub message_type: MessageType,
    pub attach_message_id: Option<MessageId>,
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Message identifier assigned by storage (bigserial).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub i64);

impl MessageId {
    /// Validate a client-supplied message id.
    ///
    /// # Errors
    /// * `NotPositive` - Storage ids start at 1
    pub fn new(id: i64) -> Result<Self, MessageIdError> {
        if id < 1 {
            Err(MessageIdError::NotPositive(id))
        } else {
            Ok(Self(id))
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Delivery state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "sent",
            MessageStatus::Delivered => "delivered",
            MessageStatus::Read => "read",
        }
    }
}

impl FromStr for MessageStatus {
    type Err = MessageKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(MessageStatus::Sent),
            "delivered" => Ok(MessageStatus::Delivered),
            "read" => Ok(MessageStatus::Read),
            other => Err(MessageKindError::UnknownStatus(other.to_string())),
        }
    }
}

/// Kind of message: a plain message, a reply to another message, or a
/// reaction attached to another message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Normal,
    Reply,
    Reaction,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Normal => "normal",
            MessageType::Reply => "reply",
            MessageType::Reaction => "reaction",
        }
    }
}

impl FromStr for MessageType {
    type Err = MessageKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(MessageType::Normal),
            "reply" => Ok(MessageType::Reply),
            "reaction" => Ok(MessageType::Reaction),
            other => Err(MessageKindError::UnknownType(other.to_string())),
        }
    }
}

/// Message body value object with validation.
///
/// Ensures the body is non-empty and within the 4000 character limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    const MAX_LENGTH: usize = 4000;

    /// Create a new validated message body.
    ///
    /// # Errors
    /// * `Empty` - Body is empty or whitespace only
    /// * `TooLong` - Body exceeds 4000 characters
    pub fn new(body: String) -> Result<Self, MessageBodyError> {
        let length = body.chars().count();
        if body.trim().is_empty() {
            Err(MessageBodyError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(MessageBodyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(body))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to send a message with validated fields.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub message_type: MessageType,
    pub attach_message_id: Option<MessageId>,
    pub body: MessageBody,
}

/// Message ready to be persisted; storage assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub status: MessageStatus,
    pub message_type: MessageType,
    pub attach_message_id: Option<MessageId>,
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
}
