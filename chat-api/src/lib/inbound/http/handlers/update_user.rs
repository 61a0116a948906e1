use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::get_user::UserResponseData;
use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::Password;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .user_service
        .update_user(&user.user_id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// HTTP request body for updating the current user (all fields optional)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUserRequest {
    username: Option<String>,
    display_name: Option<String>,
    password: Option<String>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, ApiError> {
        let mut errors = FieldErrors::default();
        let command = UpdateUserCommand {
            username: self
                .username
                .and_then(|u| errors.check("username", Username::new(u))),
            display_name: self
                .display_name
                .and_then(|d| errors.check("display_name", DisplayName::new(d))),
            password: self
                .password
                .and_then(|p| errors.check("password", Password::new(p))),
        };

        if errors.is_empty() {
            Ok(command)
        } else {
            Err(ApiError::ValidationFailed(errors))
        }
    }
}
