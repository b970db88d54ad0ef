use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{
    cookie::{CSRF_COOKIE, read_cookie, set_cookie},
    crypto::csrf::{generate_csrf_token, tokens_match},
    error::AppError,
    state::AppState,
};

/// The request and response header carrying the CSRF token.
pub const CSRF_HEADER: &str = "x-csrf-token";

fn is_safe(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

/// A middleware that verifies the CSRF token.
///
/// Double-submit check: state-changing requests must echo the `csrf_token`
/// cookie in the `x-csrf-token` header. Clients without the cookie get one,
/// and the current token is exposed on every response header.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `req` - The incoming request.
/// * `next` - The next middleware in the chain.
pub async fn verify_csrf(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (token, issued) = match read_cookie(&cookies, CSRF_COOKIE).filter(|t| !t.is_empty()) {
        Some(token) => (token, false),
        None => match generate_csrf_token() {
            Ok(token) => {
                set_cookie(&cookies, CSRF_COOKIE, token.clone(), state.config.cookie_secure);
                tracing::debug!("🔐 Issued CSRF cookie");
                (token, true)
            }
            Err(e) => return e.into_response(),
        },
    };

    if !is_safe(req.method()) {
        let header_token = req
            .headers()
            .get(CSRF_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        // A token issued on this request cannot have been echoed yet.
        if issued || !tokens_match(&token, header_token) {
            tracing::warn!("❌ CSRF check failed for {} {}", req.method(), req.uri().path());
            return AppError::Unauthorized.into_response();
        }
    }

    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&token) {
        response.headers_mut().insert(CSRF_HEADER, value);
    }

    response
}
