use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use crate::domain::message::models::Message;
use crate::domain::message::models::MessageBody;
use crate::domain::message::models::MessageId;
use crate::domain::message::models::MessageType;
use crate::domain::message::models::SendMessageCommand;
use crate::domain::message::ports::MessageServicePort;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn create_message(
    State(state): State<AppState>,
    sender: AuthenticatedUser,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<ApiSuccess<MessageResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .message_service
        .send_message(body.try_into_command(sender.user_id)?)
        .await
        .map_err(ApiError::from)
        .map(|ref message| ApiSuccess::new(StatusCode::CREATED, message.into()))
}

/// HTTP request body for sending a message (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateMessageRequest {
    to_user: String,
    mssg_type: String,
    attach_mssg_id: Option<i64>,
    mssg_body: String,
}

impl CreateMessageRequest {
    fn try_into_command(self, from_user_id: UserId) -> Result<SendMessageCommand, ApiError> {
        let mut errors = FieldErrors::default();
        let to_user_id = errors.check("to_user", UserId::from_string(&self.to_user));
        let message_type = errors.check("mssg_type", self.mssg_type.parse::<MessageType>());
        let attach_message_id = match self.attach_mssg_id {
            Some(id) => errors.check("attach_mssg_id", MessageId::new(id)).map(Some),
            None => Some(None),
        };
        let body = errors.check("mssg_body", MessageBody::new(self.mssg_body));

        match (to_user_id, message_type, attach_message_id, body) {
            (Some(to_user_id), Some(message_type), Some(attach_message_id), Some(body)) => {
                Ok(SendMessageCommand {
                    from_user_id,
                    to_user_id,
                    message_type,
                    attach_message_id,
                    body,
                })
            }
            _ => Err(ApiError::ValidationFailed(errors)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponseData {
    pub mssg_id: i64,
    pub from_user_id: String,
    pub to_user_id: String,
    pub mssg_status: String,
    pub mssg_type: String,
    pub attach_mssg_id: Option<i64>,
    pub mssg_body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Message> for MessageResponseData {
    fn from(message: &Message) -> Self {
        Self {
            mssg_id: message.id.0,
            from_user_id: message.from_user_id.to_string(),
            to_user_id: message.to_user_id.to_string(),
            mssg_status: message.status.as_str().to_string(),
            mssg_type: message.message_type.as_str().to_string(),
            attach_mssg_id: message.attach_message_id.map(|id| id.0),
            mssg_body: message.body.as_str().to_string(),
            created_at: message.created_at,
            updated_at: message.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(to_user: &str, mssg_type: &str, attach: Option<i64>, body: &str) -> CreateMessageRequest {
        CreateMessageRequest {
            to_user: to_user.to_string(),
            mssg_type: mssg_type.to_string(),
            attach_mssg_id: attach,
            mssg_body: body.to_string(),
        }
    }

    #[test]
    fn test_try_into_command_success() {
        let sender = UserId::new();
        let recipient = UserId::new();

        let command = request(&recipient.to_string(), "reaction", Some(3), "+1")
            .try_into_command(sender)
            .unwrap();

        assert_eq!(command.from_user_id, sender);
        assert_eq!(command.to_user_id, recipient);
        assert_eq!(command.message_type, MessageType::Reaction);
        assert_eq!(command.attach_message_id, Some(MessageId(3)));
    }

    #[test]
    fn test_try_into_command_collects_field_errors() {
        let result = request("not-a-uuid", "shout", Some(0), "").try_into_command(UserId::new());

        let Err(ApiError::ValidationFailed(errors)) = result else {
            panic!("expected validation failure");
        };
        let rendered = serde_json::to_value(&errors).unwrap();
        for field in ["to_user", "mssg_type", "attach_mssg_id", "mssg_body"] {
            assert!(rendered.get(field).is_some(), "missing {field}");
        }
    }
}
