use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::get_user::UserResponseData;
use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .user_service
        .create_user(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserRequest {
    username: String,
    display_name: String,
    password: String,
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, ApiError> {
        let mut errors = FieldErrors::default();
        let username = errors.check("username", Username::new(self.username));
        let display_name = errors.check("display_name", DisplayName::new(self.display_name));
        let password = errors.check("password", Password::new(self.password));

        match (username, display_name, password) {
            (Some(username), Some(display_name), Some(password)) => {
                Ok(CreateUserCommand::new(username, display_name, password))
            }
            _ => Err(ApiError::ValidationFailed(errors)),
        }
    }
}
