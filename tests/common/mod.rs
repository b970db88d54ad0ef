//! In-memory backends and HTTP helpers shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use gallery::{
    config::Config,
    crypto::password::hash_password,
    error::{AppError, Result},
    models::user::User,
    repositories::store::{PasswordResetStore, ResetLookup, SessionStore, UserStore},
    routes,
    services::email::Mailer,
    state::AppState,
};

pub const CSRF_TOKEN: &str = "test-csrf-token";
pub const PASSWORD: &str = "correct horse battery";

#[derive(Clone)]
struct SessionRow {
    id: i32,
    token_hash: String,
}

#[derive(Clone)]
struct ResetRow {
    id: i32,
    token_hash: String,
    expires_at: DateTime<Utc>,
}

/// Stores users, sessions and resets in `DashMap`s.
///
/// Sessions and resets are keyed by user ID, so the entry API gives the same
/// one-row-per-user upsert the `UNIQUE (user_id)` constraint gives in
/// PostgreSQL.
#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI32,
    users: DashMap<i32, User>,
    emails: DashMap<String, i32>,
    sessions: DashMap<i32, SessionRow>,
    resets: DashMap<i32, ResetRow>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Inserts a user with a hashed copy of `password`.
    pub fn insert_user(&self, email: &str, password: &str) -> User {
        let user = User {
            id: self.next_id(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
        };
        self.emails.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user.clone());
        user
    }

    /// Number of session rows owned by `user_id`.
    pub fn session_count(&self, user_id: i32) -> usize {
        self.sessions.iter().filter(|e| *e.key() == user_id).count()
    }

    pub fn total_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn stored_hash(&self, user_id: i32) -> Option<String> {
        self.sessions.get(&user_id).map(|row| row.token_hash.clone())
    }

    pub fn reset_count(&self) -> usize {
        self.resets.len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn upsert(&self, user_id: i32, token_hash: &str) -> Result<i32> {
        match self.sessions.entry(user_id) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().token_hash = token_hash.to_string();
                Ok(entry.get().id)
            }
            Entry::Vacant(entry) => {
                let id = self.next_id();
                entry.insert(SessionRow {
                    id,
                    token_hash: token_hash.to_string(),
                });
                Ok(id)
            }
        }
    }

    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>> {
        let user_id = self
            .sessions
            .iter()
            .find(|e| e.value().token_hash == token_hash)
            .map(|e| *e.key());
        Ok(user_id.and_then(|id| self.users.get(&id).map(|u| u.value().clone())))
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> Result<()> {
        self.sessions.retain(|_, row| row.token_hash != token_hash);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(_) => Err(AppError::EmailTaken),
            Entry::Vacant(entry) => {
                let user = User {
                    id: self.next_id(),
                    email: email.to_string(),
                    password_hash: password_hash.to_string(),
                };
                entry.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let id = self.emails.get(email).map(|e| *e.value());
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.value().clone())))
    }

    async fn update_password_hash(&self, user_id: i32, password_hash: &str) -> Result<()> {
        let mut user = self.users.get_mut(&user_id).ok_or(AppError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl PasswordResetStore for MemoryStore {
    async fn upsert(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<i32> {
        let id = match self.resets.get(&user_id) {
            Some(existing) => existing.id,
            None => self.next_id(),
        };
        self.resets.insert(
            user_id,
            ResetRow {
                id,
                token_hash: token_hash.to_string(),
                expires_at,
            },
        );
        Ok(id)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<ResetLookup>> {
        let found = self
            .resets
            .iter()
            .find(|e| e.value().token_hash == token_hash)
            .map(|e| (*e.key(), e.value().clone()));

        Ok(found.and_then(|(user_id, row)| {
            self.users.get(&user_id).map(|user| ResetLookup {
                reset_id: row.id,
                expires_at: row.expires_at,
                user: user.value().clone(),
            })
        }))
    }

    async fn delete(&self, reset_id: i32) -> Result<()> {
        self.resets.retain(|_, row| row.id != reset_id);
        Ok(())
    }
}

/// A session store whose backend is always down.
pub struct UnavailableStore;

#[async_trait]
impl SessionStore for UnavailableStore {
    async fn upsert(&self, _: i32, _: &str) -> Result<i32> {
        Err(AppError::MissingData("sessions unavailable".to_string()))
    }

    async fn find_user_by_token_hash(&self, _: &str) -> Result<Option<User>> {
        Err(AppError::MissingData("sessions unavailable".to_string()))
    }

    async fn delete_by_token_hash(&self, _: &str) -> Result<()> {
        Err(AppError::MissingData("sessions unavailable".to_string()))
    }
}

/// Records reset links instead of sending them.
#[derive(Default)]
pub struct RecordingMailer {
    sent: DashMap<String, String>,
}

impl RecordingMailer {
    pub fn reset_url_for(&self, to: &str) -> Option<String> {
        self.sent.get(to).map(|url| url.value().clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn forgot_password(&self, to: &str, reset_url: &str) -> Result<()> {
        self.sent.insert(to.to_string(), reset_url.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_app() -> TestApp {
    let store = MemoryStore::new();
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::from_stores(
        &Config::default(),
        store.clone(),
        store.clone(),
        store.clone(),
        mailer.clone(),
    );
    TestApp {
        router: routes::router(state),
        store,
        mailer,
    }
}

/// Sends a request carrying a valid CSRF pair and, optionally, a session cookie.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut cookie = format!("csrf_token={}", CSRF_TOKEN);
    if let Some(token) = session {
        cookie.push_str(&format!("; session={}", token));
    }

    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header("x-csrf-token", CSRF_TOKEN);

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Returns the value of the `session` cookie set by a response.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookie_header(response, "session").map(|raw| {
        raw.trim_start_matches("session=")
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string()
    })
}

/// Returns the raw `Set-Cookie` header for `name`.
pub fn set_cookie_header(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
