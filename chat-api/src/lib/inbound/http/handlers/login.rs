use std::sync::Arc;

use auth::AuthenticationError;
use auth::Claims;
use auth::REGULAR_AUDIENCE;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tokio::task;

use super::ApiError;
use super::ApiSuccess;
use super::FieldErrors;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Salt used to burn the same hashing cost when the username is unknown,
/// so response time does not reveal whether an account exists.
const UNKNOWN_ACCOUNT_SALT: [u8; auth::password::SALT_LENGTH] = [0; auth::password::SALT_LENGTH];

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    let Json(body) = payload?;
    let (username, password) = body.try_into_credentials()?;

    let user = match state.user_service.get_user_by_username(&username).await {
        Ok(user) => user,
        Err(UserError::NotFoundByUsername(_)) => {
            let authenticator = Arc::clone(&state.authenticator);
            let candidate = password.as_str().to_string();
            if let Err(e) = task::spawn_blocking(move || {
                authenticator.hash_password(&candidate, &UNKNOWN_ACCOUNT_SALT);
            })
            .await
            {
                tracing::warn!(error = %e, "Hashing task for unknown username failed");
            }
            tracing::info!(%username, "Login rejected: unknown username");
            return Err(ApiError::invalid_credentials());
        }
        Err(e) => return Err(ApiError::from(e)),
    };

    let claims = Claims::for_user(user.username.as_str(), user.id, REGULAR_AUDIENCE);

    let authenticator = Arc::clone(&state.authenticator);
    let candidate = password.as_str().to_string();
    let credentials = user.credentials.clone();
    let outcome = task::spawn_blocking(move || {
        authenticator.authenticate(&candidate, &credentials.as_stored(), &claims)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Password verification task failed");
        ApiError::InternalServerError(super::LOGIN_UNAVAILABLE_MESSAGE.to_string())
    })?;

    let result = outcome.map_err(|e| match e {
        AuthenticationError::InvalidCredentials => {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            ApiError::invalid_credentials()
        }
        AuthenticationError::JwtError(err) => {
            tracing::error!(error = %err, "Token generation failed");
            ApiError::InternalServerError(super::LOGIN_UNAVAILABLE_MESSAGE.to_string())
        }
    })?;

    state.user_service.record_login(&user, &password).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            token: result.access_token,
            token_type: result.token_type.to_string(),
            username: user.username.as_str().to_string(),
            display_name: user.display_name.as_str().to_string(),
            last_logged_in: user.last_logged_in,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

impl LoginRequest {
    fn try_into_credentials(self) -> Result<(Username, Password), ApiError> {
        let mut errors = FieldErrors::default();
        let username = errors.check("username", Username::new(self.username));
        let password = errors.check("password", Password::new(self.password));

        match (username, password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(ApiError::ValidationFailed(errors)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    pub token_type: String,
    pub username: String,
    pub display_name: String,
    /// Previous login, before this one was recorded
    pub last_logged_in: Option<DateTime<Utc>>,
}
