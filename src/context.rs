//! Request-scoped identity.
//!
//! `set_user` stores a [`CurrentUser`] in the request extensions when the
//! session cookie resolves. Nothing else writes it, and readers get `None`
//! for anonymous requests.

use axum::http::Request;

use crate::models::user::User;

/// The user resolved for the current request.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Attaches a resolved user to a request.
pub fn with_user<B>(request: &mut Request<B>, user: User) {
    request.extensions_mut().insert(CurrentUser(user));
}

/// Returns the user attached to a request, if any.
pub fn current_user<B>(request: &Request<B>) -> Option<&User> {
    request
        .extensions()
        .get::<CurrentUser>()
        .map(|current| &current.0)
}
