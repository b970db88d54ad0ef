use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// Builds the application router.
///
/// Per request the interceptors run in this order: cookie parsing, CSRF
/// check, identity propagation, then the access gate on gated routes only.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::auth::health))
        .route("/signup", post(handlers::auth::signup))
        .route("/signin", post(handlers::auth::signin))
        .route("/forgot-pw", post(handlers::auth::forgot_password))
        .route("/reset-pw", post(handlers::auth::reset_password));

    let gated_routes = Router::new()
        .route("/signout", post(handlers::auth::signout))
        .route("/users/me", get(handlers::auth::current_user))
        .route_layer(from_fn(middleware_layer::auth::require_user));

    Router::new()
        .merge(public_routes)
        .merge(gated_routes)
        .nest_service("/assets", ServeDir::new(&state.config.assets_dir))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::set_user,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::csrf::verify_csrf,
        ))
        .layer(CookieManagerLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .with_state(state)
}
