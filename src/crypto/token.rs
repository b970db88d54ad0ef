use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

/// The minimum number of random bytes behind any generated token (256 bits).
pub const MIN_BYTES_PER_TOKEN: usize = 32;

/// Returns the byte length actually used for a token request.
pub fn effective_token_len(requested: usize) -> usize {
    requested.max(MIN_BYTES_PER_TOKEN)
}

/// Generates a URL-safe random token from the operating system's CSPRNG.
///
/// Requests below [`MIN_BYTES_PER_TOKEN`] are upgraded to the minimum.
///
/// # Arguments
///
/// * `byte_len` - The number of random bytes to encode.
///
/// # Returns
///
/// A URL-safe base64-encoded token, or `AppError::RandomSource`.
pub fn generate_token(byte_len: usize) -> Result<String> {
    generate_token_with(&mut OsRng, byte_len)
}

/// Generates a token from the given random source.
pub fn generate_token_with<R: RngCore + ?Sized>(rng: &mut R, byte_len: usize) -> Result<String> {
    let mut bytes = vec![0u8; effective_token_len(byte_len)];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::RandomSource(format!("Failed to read random bytes: {}", e)))?;

    Ok(general_purpose::URL_SAFE_NO_PAD.encode(&bytes))
}

/// A source of fresh session tokens.
pub trait TokenGenerator: Send + Sync {
    /// Returns a token backed by at least `byte_len` random bytes.
    fn generate(&self, byte_len: usize) -> Result<String>;
}

/// Draws tokens from the operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTokenGenerator;

impl TokenGenerator for OsTokenGenerator {
    fn generate(&self, byte_len: usize) -> Result<String> {
        generate_token(byte_len)
    }
}

/// Hashes a token for storage.
///
/// SHA-256, URL-safe base64 encoded. No salt and no key: tokens are uniformly
/// random and replaced on every sign-in, so the digest only has to be one-way
/// and deterministic.
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(digest)
}
