use std::collections::BTreeMap;
use std::fmt::Display;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::domain::message::errors::MessageError;
use crate::user::errors::UserError;

pub mod create_message;
pub mod create_user;
pub mod get_user;
pub mod health;
pub mod login;
pub mod update_user;

pub const UNAUTHENTICATED_MESSAGE: &str = "please authenticate before proceeding";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "username or password is invalid";
pub const LOGIN_UNAVAILABLE_MESSAGE: &str = "could not login at this time";
pub const INTERNAL_ERROR_MESSAGE: &str = "could not process request at this time";
pub const USER_STORAGE_MESSAGE: &str = "could not create user at this moment";
pub const MESSAGE_STORAGE_MESSAGE: &str = "could not create message at this moment";
pub const UNDECODABLE_BODY_MESSAGE: &str = "could not decode data";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Per-field validation failures, rendered as `{"field": "reason"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn single(field: &str, reason: impl Display) -> Self {
        let mut errors = Self::default();
        errors.insert(field, reason);
        errors
    }

    pub fn insert(&mut self, field: &str, reason: impl Display) {
        self.0.insert(field.to_string(), reason.to_string());
    }

    /// Keep the value on success, record the reason under `field` on failure.
    pub fn check<T, E: Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.insert(field, e);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    InsufficientStorage(String),
    BadRequest(String),
    ValidationFailed(FieldErrors),
    Conflict(FieldErrors),
    Unauthorized(String),
}

impl ApiError {
    /// The single response used for every rejected authentication attempt.
    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized(UNAUTHENTICATED_MESSAGE.to_string())
    }

    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        ApiError::BadRequest(UNDECODABLE_BODY_MESSAGE.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorMessage::Text(msg))
            }
            ApiError::InsufficientStorage(msg) => {
                (StatusCode::INSUFFICIENT_STORAGE, ErrorMessage::Text(msg))
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorMessage::Text(msg)),
            ApiError::ValidationFailed(fields) => {
                (StatusCode::BAD_REQUEST, ErrorMessage::Fields(fields))
            }
            ApiError::Conflict(fields) => (StatusCode::CONFLICT, ErrorMessage::Fields(fields)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, ErrorMessage::Text(msg)),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), "Request rejected");
        }

        (status, Json(ApiErrorData { message })).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::unauthenticated(),
            UserError::NotFoundByUsername(_) => ApiError::invalid_credentials(),
            UserError::UsernameAlreadyExists(_) => {
                ApiError::Conflict(FieldErrors::single("username", "already exists"))
            }
            UserError::InvalidUsername(e) => {
                ApiError::ValidationFailed(FieldErrors::single("username", e))
            }
            UserError::InvalidDisplayName(e) => {
                ApiError::ValidationFailed(FieldErrors::single("display_name", e))
            }
            UserError::InvalidPassword(e) => {
                ApiError::ValidationFailed(FieldErrors::single("password", e))
            }
            UserError::InvalidUserId(e) => {
                ApiError::ValidationFailed(FieldErrors::single("user_id", e))
            }
            UserError::Password(e) => {
                tracing::error!(error = %e, "Could not derive password credentials");
                ApiError::InsufficientStorage(USER_STORAGE_MESSAGE.to_string())
            }
            UserError::DatabaseError(e) | UserError::Unknown(e) => {
                tracing::error!(error = %e, "User storage failure");
                ApiError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string())
            }
        }
    }
}

impl From<MessageError> for ApiError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::InvalidMessageId(e) => {
                ApiError::ValidationFailed(FieldErrors::single("attach_mssg_id", e))
            }
            MessageError::InvalidBody(e) => {
                ApiError::ValidationFailed(FieldErrors::single("mssg_body", e))
            }
            MessageError::InvalidKind(e) => {
                ApiError::ValidationFailed(FieldErrors::single("mssg_type", e))
            }
            MessageError::InvalidUserId(e) => {
                ApiError::ValidationFailed(FieldErrors::single("to_user", e))
            }
            MessageError::RecipientNotFound(_) => {
                ApiError::ValidationFailed(FieldErrors::single("to_user", "no such user"))
            }
            MessageError::AttachmentNotFound(_) => {
                ApiError::ValidationFailed(FieldErrors::single("attach_mssg_id", "no such message"))
            }
            MessageError::DatabaseError(e) => {
                tracing::error!(error = %e, "Message storage failure");
                ApiError::InsufficientStorage(MESSAGE_STORAGE_MESSAGE.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Text(String),
    Fields(FieldErrors),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: ErrorMessage,
}
