//! CSRF token store: one active token per user key.
//!
//! Validation scans every entry and compares in constant time. Tokens are not
//! rotated on use; a token stays valid until it expires or its key is reissued.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::crypto::{constant_time_compare, generate_secure_token};

#[derive(Debug, Clone, Copy)]
pub struct CsrfConfig {
    pub ttl: Duration,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(1),
        }
    }
}

#[derive(Debug, Clone)]
struct CsrfEntry {
    token: String,
    expires_at: DateTime<Utc>,
}

pub struct CsrfTokenStore {
    tokens: DashMap<String, CsrfEntry>,
    config: CsrfConfig,
}

impl CsrfTokenStore {
    pub fn new(config: CsrfConfig) -> Self {
        Self {
            tokens: DashMap::new(),
            config,
        }
    }

    /// Issue a fresh token for `user_key`, replacing any previous one.
    pub fn issue(&self, user_key: &str) -> String {
        self.issue_at(user_key, Utc::now())
    }

    pub fn issue_at(&self, user_key: &str, now: DateTime<Utc>) -> String {
        let token = generate_secure_token();
        self.tokens.insert(
            user_key.to_string(),
            CsrfEntry {
                token: token.clone(),
                expires_at: now + self.config.ttl,
            },
        );
        token
    }

    pub fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> bool {
        if token.is_empty() {
            return false;
        }
        self.tokens.iter().any(|entry| {
            constant_time_compare(entry.token.as_bytes(), token.as_bytes()) && now < entry.expires_at
        })
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, entry| now < entry.expires_at);
        before.saturating_sub(self.tokens.len())
    }

    pub fn reset(&self) {
        self.tokens.clear();
    }

    pub fn start_cleanup_task(
        self: Arc<Self>,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        const CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(CLEANUP_INTERVAL);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = self.purge_expired(Utc::now());
                        if removed > 0 {
                            tracing::info!(count = removed, "Purged expired CSRF tokens");
                        }
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
        })
    }
}

impl Default for CsrfTokenStore {
    fn default() -> Self {
        Self::new(CsrfConfig::default())
    }
}
