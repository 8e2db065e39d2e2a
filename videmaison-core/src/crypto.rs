//! Token generation, constant-time comparison and password hashing.

use rand::{TryRngCore, rngs::OsRng};
use subtle::ConstantTimeEq;

/// 256-bit random token, URL-safe base64 without padding (43 chars).
///
/// # Panics
///
/// Panics if the OS random number generator fails.
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}

pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Argon2id PHC string for `password`.
pub fn hash_password(password: &str) -> String {
    password_auth::generate_hash(password)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    password_auth::verify_password(password, hash).is_ok()
}
