use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use garde::Validate;
use serde::Serialize;
use tower_cookies::Cookies;

use crate::{
    context::CurrentUser,
    cookie::{SESSION_COOKIE, delete_cookie, read_cookie, set_cookie},
    error::{AppError, Result},
    state::AppState,
    validation::auth::{CredentialsRequest, ForgotPasswordRequest, ResetPasswordRequest},
};

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// The identity returned by `/users/me`.
#[derive(Serialize)]
pub struct MeResponse {
    pub id: i32,
    pub email: String,
}

fn auth_response(status: StatusCode, message: &str) -> Response {
    let body = AuthResponse {
        success: true,
        message: message.to_string(),
    };
    (status, Json(body)).into_response()
}

/// Starts a session for `user_id` and hands its token to the client.
async fn sign_in(state: &AppState, cookies: &Cookies, user_id: i32) -> Result<()> {
    let session = state.sessions.create(user_id).await?;
    set_cookie(cookies, SESSION_COOKIE, session.token, state.config.cookie_secure);
    tracing::info!("✅ Session cookie set for user: {}", user_id);
    Ok(())
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response> {
    payload.validate()?;

    let user = state.users.create(&payload.email, &payload.password).await?;
    sign_in(&state, &cookies, user.id).await?;

    Ok(auth_response(StatusCode::CREATED, "Registration successful. Welcome!"))
}

/// Handles user sign-in.
///
/// Signing in replaces any session the user already holds elsewhere.
#[axum::debug_handler]
pub async fn signin(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response> {
    let user = state
        .users
        .authenticate(&payload.email, &payload.password)
        .await?;
    sign_in(&state, &cookies, user.id).await?;

    Ok(auth_response(StatusCode::OK, "Sign in successful"))
}

/// Handles user sign-out.
#[axum::debug_handler]
pub async fn signout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    cookies: Cookies,
) -> Result<Response> {
    let token = read_cookie(&cookies, SESSION_COOKIE).ok_or(AppError::Unauthorized)?;

    state.sessions.delete(&token).await?;
    delete_cookie(&cookies, SESSION_COOKIE, state.config.cookie_secure);

    tracing::info!("👋 User signed out: {}", user.id);
    Ok(auth_response(StatusCode::OK, "Sign out successful"))
}

/// Returns the signed-in user.
pub async fn current_user(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        email: user.email,
    })
}

/// Emails a password reset link.
///
/// Answers the same way whether or not the email belongs to an account.
#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Response> {
    payload.validate()?;

    match state.password_resets.create(&payload.email).await {
        Ok(reset) => {
            let reset_url = format!("{}/reset-pw?token={}", state.config.base_url, reset.token);
            state.mailer.forgot_password(&payload.email, &reset_url).await?;
        }
        Err(AppError::NotFound) => {
            tracing::debug!("Password reset requested for unknown email");
        }
        Err(e) => return Err(e),
    }

    Ok(auth_response(
        StatusCode::OK,
        "If that email belongs to an account, a reset link is on its way.",
    ))
}

/// Completes a password reset and signs the user in.
#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Response> {
    payload.validate()?;

    let user = match state
        .password_resets
        .consume(&payload.token, &payload.password)
        .await
    {
        Ok(user) => user,
        Err(AppError::NotFound) => {
            return Err(AppError::Authentication(
                "Invalid or expired reset token".to_string(),
            ));
        }
        Err(e) => return Err(e),
    };

    sign_in(&state, &cookies, user.id).await?;

    Ok(auth_response(StatusCode::OK, "Password reset successful"))
}

/// The body returned by `/health`.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
