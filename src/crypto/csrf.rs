use subtle::ConstantTimeEq;

use crate::crypto::token::{MIN_BYTES_PER_TOKEN, generate_token};
use crate::error::Result;

/// Generates a new random CSRF token.
///
/// # Returns
///
/// A URL-safe base64-encoded CSRF token.
pub fn generate_csrf_token() -> Result<String> {
    generate_token(MIN_BYTES_PER_TOKEN)
}

/// Compares the cookie and header copies of a CSRF token in constant time.
pub fn tokens_match(cookie_token: &str, header_token: &str) -> bool {
    if cookie_token.is_empty() {
        return false;
    }
    cookie_token.as_bytes().ct_eq(header_token.as_bytes()).into()
}
