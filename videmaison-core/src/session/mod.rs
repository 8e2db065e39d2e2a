//! Stateless bearer tokens.
//!
//! Access tokens are short-lived and carry the user's role; refresh tokens are
//! long-lived and can only be exchanged for a new access token. There is no
//! revocation list, so logout is client-side.

pub mod jwt;

pub use jwt::{Claims, JwtConfig, TokenIssuer, TokenType};
