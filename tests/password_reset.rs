mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{MemoryStore, PASSWORD, body_json, send, session_cookie, test_app};
use gallery::{
    crypto::password::verify_password,
    error::{AppError, Result},
    models::user::User,
    repositories::store::UserStore,
    services::password_reset::PasswordResetService,
};
use serde_json::json;

const NEW_PASSWORD: &str = "a brand new passphrase";

fn reset_service(store: &Arc<MemoryStore>, duration: Duration) -> PasswordResetService {
    PasswordResetService::new(store.clone(), store.clone(), duration)
}

/// Reads users from the memory store but cannot write password hashes.
struct ReadOnlyUsers(Arc<MemoryStore>);

#[async_trait]
impl UserStore for ReadOnlyUsers {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        self.0.create(email, password_hash).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.0.find_by_email(email).await
    }

    async fn update_password_hash(&self, _user_id: i32, _password_hash: &str) -> Result<()> {
        Err(AppError::MissingData("users unavailable".to_string()))
    }
}

fn token_from_url(url: &str) -> String {
    url.split("token=").nth(1).unwrap().to_string()
}

#[tokio::test]
async fn consume_returns_the_user_once() {
    let store = MemoryStore::new();
    let user = store.insert_user("ada@example.com", PASSWORD);
    let resets = reset_service(&store, Duration::minutes(60));

    let reset = resets.create("ADA@example.com").await.unwrap();
    assert_eq!(reset.user_id, user.id);

    assert_eq!(resets.consume(&reset.token, NEW_PASSWORD).await.unwrap().id, user.id);
    assert!(matches!(
        resets.consume(&reset.token, NEW_PASSWORD).await,
        Err(AppError::NotFound)
    ));
    assert_eq!(store.reset_count(), 0);

    let stored = store.find_by_email("ada@example.com").await.unwrap().unwrap();
    assert!(verify_password(NEW_PASSWORD, &stored.password_hash).unwrap());
}

#[tokio::test]
async fn unknown_email_is_not_found() {
    let store = MemoryStore::new();
    let resets = reset_service(&store, Duration::minutes(60));

    assert!(matches!(
        resets.create("nobody@example.com").await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn newer_reset_replaces_older_one() {
    let store = MemoryStore::new();
    store.insert_user("ada@example.com", PASSWORD);
    let resets = reset_service(&store, Duration::minutes(60));

    let first = resets.create("ada@example.com").await.unwrap();
    let second = resets.create("ada@example.com").await.unwrap();

    assert_eq!(store.reset_count(), 1);
    assert!(matches!(
        resets.consume(&first.token, NEW_PASSWORD).await,
        Err(AppError::NotFound)
    ));
    assert!(resets.consume(&second.token, NEW_PASSWORD).await.is_ok());
}

#[tokio::test]
async fn expired_token_is_rejected_and_removed() {
    let store = MemoryStore::new();
    store.insert_user("ada@example.com", PASSWORD);
    let resets = reset_service(&store, Duration::minutes(-1));

    let reset = resets.create("ada@example.com").await.unwrap();

    assert!(matches!(
        resets.consume(&reset.token, NEW_PASSWORD).await,
        Err(AppError::Authentication(_))
    ));
    assert_eq!(store.reset_count(), 0);

    let stored = store.find_by_email("ada@example.com").await.unwrap().unwrap();
    assert!(verify_password(PASSWORD, &stored.password_hash).unwrap());
}

#[tokio::test]
async fn failed_password_update_keeps_the_token_usable() {
    let store = MemoryStore::new();
    let user = store.insert_user("ada@example.com", PASSWORD);
    let broken = PasswordResetService::new(
        store.clone(),
        Arc::new(ReadOnlyUsers(store.clone())),
        Duration::minutes(60),
    );

    let reset = broken.create("ada@example.com").await.unwrap();
    let err = broken.consume(&reset.token, NEW_PASSWORD).await.unwrap_err();

    assert!(err.is_persistence());
    assert_eq!(store.reset_count(), 1);

    let resets = reset_service(&store, Duration::minutes(60));
    assert_eq!(resets.consume(&reset.token, NEW_PASSWORD).await.unwrap().id, user.id);
    assert_eq!(store.reset_count(), 0);
}

#[tokio::test]
async fn reset_by_email_signs_the_user_in() {
    let app = test_app();
    let user = app.store.insert_user("ada@example.com", PASSWORD);

    let response = send(
        &app.router,
        Method::POST,
        "/forgot-pw",
        None,
        Some(json!({ "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let url = app.mailer.reset_url_for("ada@example.com").expect("reset mail sent");
    assert!(url.starts_with("http://localhost:3000/reset-pw?token="));
    let token = token_from_url(&url);

    let response = send(
        &app.router,
        Method::POST,
        "/reset-pw",
        None,
        Some(json!({ "token": token, "password": NEW_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let session = session_cookie(&response).expect("signed in after reset");

    let me = send(&app.router, Method::GET, "/users/me", Some(&session), None).await;
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body_json(me).await["id"], user.id);

    let old = send(
        &app.router,
        Method::POST,
        "/signin",
        None,
        Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = send(
        &app.router,
        Method::POST,
        "/signin",
        None,
        Some(json!({ "email": "ada@example.com", "password": NEW_PASSWORD })),
    )
    .await;
    assert_eq!(new.status(), StatusCode::OK);

    let reused = send(
        &app.router,
        Method::POST,
        "/reset-pw",
        None,
        Some(json!({ "token": token, "password": NEW_PASSWORD })),
    )
    .await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forgot_password_for_unknown_email_looks_the_same() {
    let app = test_app();

    let response = send(
        &app.router,
        Method::POST,
        "/forgot-pw",
        None,
        Some(json!({ "email": "nobody@example.com" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
    assert_eq!(app.mailer.sent_count(), 0);
}
