use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{
    context::{current_user, with_user},
    cookie::{SESSION_COOKIE, read_cookie},
    error::AppError,
    state::AppState,
};

/// Where the access gate sends anonymous requests.
pub const SIGN_IN_PATH: &str = "/signin";

/// Resolves the session cookie and attaches the user to the request.
///
/// Never rejects a request because of a missing, unknown or superseded
/// token; those requests continue anonymously. A cookie present with an
/// empty value is answered with `400 Bad Request`, and store failures
/// surface as the usual error response.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
pub async fn set_user(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = read_cookie(&cookies, SESSION_COOKIE) else {
        return next.run(request).await;
    };

    if token.is_empty() {
        tracing::warn!("❌ Empty session cookie");
        return AppError::Validation("The session token is empty".to_string()).into_response();
    }

    match state.sessions.user(&token).await {
        Ok(user) => {
            tracing::debug!("✅ Session resolved to user: {}", user.id);
            with_user(&mut request, user);
        }
        Err(AppError::NotFound) => {
            tracing::debug!("🔑 Session cookie does not resolve, continuing anonymously");
        }
        Err(e) => return e.into_response(),
    }

    next.run(request).await
}

/// Lets the request through only when `set_user` attached a user.
///
/// Anonymous requests are redirected to the sign-in page and the wrapped
/// handler never runs.
pub async fn require_user(request: Request<Body>, next: Next) -> Response {
    if current_user(&request).is_none() {
        tracing::debug!("🔒 Anonymous request to {}, redirecting", request.uri().path());
        return redirect_to_sign_in();
    }

    next.run(request).await
}

fn redirect_to_sign_in() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, SIGN_IN_PATH)]).into_response()
}
