use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use super::handlers::LOGIN_UNAVAILABLE_MESSAGE;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

const BEARER_SCHEME: &str = "Bearer";

/// Identity established for the current request.
///
/// Produced by the authentication gate and handed to handlers as an
/// extractor argument. Lives only as long as the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: Username,
    pub display_name: DisplayName,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            display_name: user.display_name.clone(),
        }
    }
}

/// Middleware that validates the bearer token, resolves the account and
/// adds the identity to request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate_headers(&state, req.headers()).await?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Run every gate check against the request headers.
///
/// Rejections that a client could learn from (missing header, malformed
/// scheme, bad token, unknown account) all produce the same 401.
pub async fn authenticate_headers(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, ApiError> {
    let token = extract_token_from_header(headers)?;

    // Reason already logged by the token codec
    let claims = state
        .authenticator
        .validate_token(token)
        .map_err(|_| ApiError::unauthenticated())?;

    let username = Username::new(claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Token subject is not a valid username");
        ApiError::unauthenticated()
    })?;
    let user_id = UserId::from_string(&claims.uid).map_err(|e| {
        tracing::warn!(error = %e, "Token user id is not a valid identifier");
        ApiError::unauthenticated()
    })?;

    let user = state
        .user_service
        .resolve_identity(&username, &user_id)
        .await
        .map_err(|e| match e {
            UserError::NotFound(_) => {
                tracing::warn!(%user_id, %username, "Token does not match any account");
                ApiError::unauthenticated()
            }
            other => {
                tracing::error!(error = %other, "Identity resolution failed");
                ApiError::InternalServerError(LOGIN_UNAVAILABLE_MESSAGE.to_string())
            }
        })?;

    Ok(AuthenticatedUser::from(&user))
}

fn extract_token_from_header(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers.get(header::AUTHORIZATION).ok_or_else(|| {
        tracing::debug!("Missing Authorization header");
        ApiError::unauthenticated()
    })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        tracing::debug!("Authorization header is not visible ASCII");
        ApiError::unauthenticated()
    })?;

    let mut parts = auth_str.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => {
            tracing::debug!("Authorization header is not of the form 'Bearer <token>'");
            Err(ApiError::unauthenticated())
        }
    }
}

/// Handlers take `AuthenticatedUser` directly. When the gate ran, the
/// identity is taken from the request; otherwise the gate runs here.
#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        tracing::debug!("No identity on request; authenticating in extractor");
        let user = authenticate_headers(state, &parts.headers).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_token_accepts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_token_from_header(&headers), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_rejects_malformed_headers() {
        for value in [
            "abc.def.ghi",
            "Bearer",
            "Bearer ",
            "bearer abc.def.ghi",
            "Basic YWxpY2U6cGFzcw==",
            "Bearer abc.def.ghi extra",
            "Bearer  abc.def.ghi",
        ] {
            assert_eq!(
                extract_token_from_header(&headers_with(value)),
                Err(ApiError::unauthenticated()),
                "accepted {value:?}"
            );
        }
    }

    #[test]
    fn test_extract_token_requires_header() {
        assert_eq!(
            extract_token_from_header(&HeaderMap::new()),
            Err(ApiError::unauthenticated())
        );
    }
}
