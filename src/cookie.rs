use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

/// The cookie carrying the raw session token.
pub const SESSION_COOKIE: &str = "session";
/// The cookie carrying the CSRF double-submit token.
pub const CSRF_COOKIE: &str = "csrf_token";

/// Builds a cookie scoped to the whole site.
///
/// Every cookie except the CSRF token is hidden from scripts.
pub fn new_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie.set_http_only(name != CSRF_COOKIE);
    cookie.set_same_site(SameSite::Lax);
    if secure {
        cookie.set_secure(true);
    }
    cookie
}

/// Sets a cookie on the response.
pub fn set_cookie(cookies: &Cookies, name: &'static str, value: String, secure: bool) {
    cookies.add(new_cookie(name, value, secure));
}

/// Reads a cookie value from the request.
pub fn read_cookie(cookies: &Cookies, name: &str) -> Option<String> {
    cookies.get(name).map(|cookie| cookie.value().to_string())
}

/// Clears a cookie: empty value, expired immediately.
pub fn delete_cookie(cookies: &Cookies, name: &'static str, secure: bool) {
    let mut cookie = new_cookie(name, String::new(), secure);
    cookie.set_max_age(Duration::seconds(0));
    cookies.remove(cookie);
}
