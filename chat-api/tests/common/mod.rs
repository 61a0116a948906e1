#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Claims;
use auth::PasswordHasher;
use auth::SigningSecret;
use auth::REGULAR_AUDIENCE;
use axum::body::Body;
use axum::http::header;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use chat_api::domain::message::errors::MessageError;
use chat_api::domain::message::models::Message;
use chat_api::domain::message::models::MessageId;
use chat_api::domain::message::models::NewMessage;
use chat_api::domain::message::ports::MessageRepository;
use chat_api::domain::message::service::MessageService;
use chat_api::domain::user::errors::UserError;
use chat_api::domain::user::models::PasswordCredentials;
use chat_api::domain::user::models::User;
use chat_api::domain::user::models::UserId;
use chat_api::domain::user::models::Username;
use chat_api::domain::user::ports::UserRepository;
use chat_api::domain::user::service::UserService;
use chat_api::inbound::http::router::create_router;
use chrono::DateTime;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

/// Base64 of `test-secret-key-for-jwt-signing-at-least-32-bytes`
pub const TEST_SECRET_BASE64: &str =
    "dGVzdC1zZWNyZXQta2V5LWZvci1qd3Qtc2lnbmluZy1hdC1sZWFzdC0zMi1ieXRlcw==";
pub const TEST_ITERATIONS: u32 = 1_000;

/// In-memory user storage honouring the same uniqueness rules as the
/// PostgreSQL schema.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
    pub fail_lookups: std::sync::atomic::AtomicBool,
}

impl InMemoryUserRepository {
    pub fn get(&self, id: &UserId) -> Option<User> {
        self.users.lock().unwrap().get(id).cloned()
    }

    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    fn check_available(
        users: &HashMap<UserId, User>,
        username: &Username,
        owner: UserId,
    ) -> Result<(), UserError> {
        if users
            .values()
            .any(|u| u.username == *username && u.id != owner)
        {
            return Err(UserError::UsernameAlreadyExists(username.to_string()));
        }
        Ok(())
    }

    fn check_online(&self) -> Result<(), UserError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(UserError::DatabaseError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        Self::check_available(&users, &user.username, user.id)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.check_online()?;
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        self.check_online()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == *username)
            .cloned())
    }

    async fn find_by_username_and_id(
        &self,
        username: &Username,
        id: &UserId,
    ) -> Result<Option<User>, UserError> {
        self.check_online()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(id)
            .filter(|u| u.username == *username)
            .cloned())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id.to_string()));
        }
        Self::check_available(&users, &user.username, user.id)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn touch_last_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), UserError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.last_logged_in = Some(at);
        Ok(())
    }

    async fn update_credentials(
        &self,
        id: &UserId,
        current: &PasswordCredentials,
        replacement: &PasswordCredentials,
    ) -> Result<bool, UserError> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(id) {
            Some(user)
                if user.credentials.hash == current.hash
                    && user.credentials.iterations == current.iterations =>
            {
                user.credentials.hash = replacement.hash.clone();
                user.credentials.iterations = replacement.iterations;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
    next_id: AtomicI64,
}

impl InMemoryMessageRepository {
    pub fn all(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: NewMessage) -> Result<Message, MessageError> {
        let mut messages = self.messages.lock().unwrap();
        if let Some(attachment) = message.attach_message_id {
            if !messages.iter().any(|m| m.id == attachment) {
                return Err(MessageError::AttachmentNotFound(attachment));
            }
        }

        let stored = Message {
            id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            from_user_id: message.from_user_id,
            to_user_id: message.to_user_id,
            status: message.status,
            message_type: message.message_type,
            attach_message_id: message.attach_message_id,
            body: message.body,
            created_at: message.created_at,
            updated_at: message.created_at,
        };
        messages.push(stored.clone());
        Ok(stored)
    }
}

/// Test application driving the real router in-process
pub struct TestApp {
    pub router: Router,
    pub authenticator: Arc<Authenticator>,
    pub users: Arc<InMemoryUserRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::spawn_with_iterations(TEST_ITERATIONS)
    }

    pub fn spawn_with_iterations(iterations: u32) -> Self {
        let secret = SigningSecret::from_base64(TEST_SECRET_BASE64).unwrap();
        let password_hasher = PasswordHasher::new(iterations);
        let authenticator = Arc::new(Authenticator::new(&secret, password_hasher));

        let users = Arc::new(InMemoryUserRepository::default());
        let messages = Arc::new(InMemoryMessageRepository::default());

        let user_service = Arc::new(UserService::new(Arc::clone(&users), password_hasher));
        let message_service = Arc::new(MessageService::new(
            Arc::clone(&messages),
            Arc::clone(&users),
        ));

        let router = create_router(user_service, message_service, Arc::clone(&authenticator));

        Self {
            router,
            authenticator,
            users,
            messages,
        }
    }

    /// Send a request and return status and parsed JSON body
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let authorization = token.map(|t| format!("Bearer {}", t));
        self.request(Method::GET, path, authorization.as_deref(), None)
            .await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let authorization = token.map(|t| format!("Bearer {}", t));
        self.request(Method::POST, path, authorization.as_deref(), Some(body))
            .await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let authorization = format!("Bearer {}", token);
        self.request(Method::PATCH, path, Some(&authorization), Some(body))
            .await
    }

    /// Register a user and return its id
    pub async fn register(&self, username: &str, display_name: &str, password: &str) -> UserId {
        let (status, body) = self
            .post(
                "/api/v1/users",
                None,
                serde_json::json!({
                    "username": username,
                    "display_name": display_name,
                    "password": password,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        UserId::from_string(body["user_id"].as_str().unwrap()).unwrap()
    }

    /// Log in and return the issued token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                None,
                serde_json::json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Sign a token for arbitrary claims with the application secret
    pub fn token_for(&self, claims: &Claims) -> String {
        self.authenticator.generate_token(claims).unwrap()
    }

    /// Claims for a user issued at an explicit instant
    pub fn claims_at(username: &str, user_id: UserId, issued_at: DateTime<Utc>) -> Claims {
        Claims::for_user_at(username, user_id, REGULAR_AUDIENCE, issued_at)
    }
}
