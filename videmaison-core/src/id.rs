//! Prefixed random identifiers (`usr_…`, `req_…`, `msg_…`).

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

/// Generate `{prefix}_{random}` with 96 bits of entropy, URL-safe.
pub fn generate_prefixed_id(prefix: &str) -> String {
    let mut bytes = [0u8; 12];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");

    format!("{prefix}_{}", BASE64_URL_SAFE_NO_PAD.encode(bytes))
}

pub fn has_prefix(id: &str, expected_prefix: &str) -> bool {
    id.strip_prefix(expected_prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|rest| !rest.is_empty())
}

/// Declares an opaque string identifier newtype with a fixed prefix.
macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new(id: &str) -> Self {
                Self(id.to_string())
            }

            pub fn new_random() -> Self {
                Self($crate::id::generate_prefixed_id($prefix))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }

            pub fn is_valid(&self) -> bool {
                $crate::id::has_prefix(&self.0, $prefix)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pub(crate) use prefixed_id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_prefixed_id() {
        let id = generate_prefixed_id("req");
        assert!(id.starts_with("req_"));
        // 12 bytes -> 16 base64 chars
        assert_eq!(id.len(), "req_".len() + 16);
        assert!(has_prefix(&id, "req"));
        assert!(!has_prefix(&id, "usr"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = generate_prefixed_id("msg");
        let b = generate_prefixed_id("msg");
        assert_ne!(a, b);
    }

    #[test]
    fn test_has_prefix_rejects_bare_prefix() {
        assert!(!has_prefix("usr_", "usr"));
        assert!(!has_prefix("usr", "usr"));
    }
}
