//! Process-local security state.
//!
//! [`SecurityState`] bundles the in-memory stores consulted by the request
//! layer: the general API limiter (with escalation), the tighter registration
//! and login limiters (without escalation) and the CSRF token store. It is
//! created once at startup and shared behind an `Arc`; tests build their own
//! and call [`SecurityState::reset`] between scenarios.
//!
//! Lock and block expiry is lazy: reads may clear expired state. The optional
//! cleanup task only reclaims memory.

pub mod csrf;
pub mod login_guard;
pub mod rate_limit;

pub use csrf::{CsrfConfig, CsrfTokenStore};
pub use login_guard::{LoginGuard, LoginGuardConfig};
pub use rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimiter};

use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct SecurityConfig {
    pub general_api: RateLimitPolicy,
    pub registration: RateLimitPolicy,
    pub login: RateLimitPolicy,
    pub csrf: CsrfConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            general_api: RateLimitPolicy::general_api(),
            registration: RateLimitPolicy::registration(),
            login: RateLimitPolicy::login(),
            csrf: CsrfConfig::default(),
        }
    }
}

pub struct SecurityState {
    general_api: Arc<RateLimiter>,
    registration: Arc<RateLimiter>,
    login: Arc<RateLimiter>,
    csrf: Arc<CsrfTokenStore>,
}

impl SecurityState {
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            general_api: Arc::new(RateLimiter::new(config.general_api)),
            registration: Arc::new(RateLimiter::new(config.registration)),
            login: Arc::new(RateLimiter::new(config.login)),
            csrf: Arc::new(CsrfTokenStore::new(config.csrf)),
        }
    }

    pub fn general_api(&self) -> &RateLimiter {
        &self.general_api
    }

    pub fn registration(&self) -> &RateLimiter {
        &self.registration
    }

    pub fn login(&self) -> &RateLimiter {
        &self.login
    }

    pub fn csrf(&self) -> &CsrfTokenStore {
        &self.csrf
    }

    pub fn reset(&self) {
        self.general_api.reset();
        self.registration.reset();
        self.login.reset();
        self.csrf.reset();
    }

    /// Spawns one cleanup task per store; all stop when `shutdown` flips.
    pub fn start_cleanup_tasks(
        &self,
        shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> Vec<tokio::task::JoinHandle<()>> {
        vec![
            Arc::clone(&self.general_api).start_cleanup_task(shutdown.clone()),
            Arc::clone(&self.registration).start_cleanup_task(shutdown.clone()),
            Arc::clone(&self.login).start_cleanup_task(shutdown.clone()),
            Arc::clone(&self.csrf).start_cleanup_task(shutdown),
        ]
    }
}

impl Default for SecurityState {
    fn default() -> Self {
        Self::new(SecurityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_default_policies() {
        let state = SecurityState::default();
        assert_eq!(state.general_api().policy().max_requests, 60);
        assert!(state.general_api().policy().block_duration.is_some());
        assert_eq!(state.registration().policy().max_requests, 3);
        assert_eq!(state.login().policy().max_requests, 5);
        assert!(state.login().policy().block_duration.is_none());
    }

    #[test]
    fn test_reset_clears_every_store() {
        let state = SecurityState::default();
        let now = Utc::now();
        for _ in 0..3 {
            state.registration().check_at("register:1.2.3.4", now);
        }
        assert!(!state.registration().check_at("register:1.2.3.4", now).is_allowed());
        let token = state.csrf().issue("usr_1");

        state.reset();

        assert!(state.registration().check_at("register:1.2.3.4", now).is_allowed());
        assert!(!state.csrf().validate(&token));
    }

    #[tokio::test]
    async fn test_cleanup_tasks_stop_on_shutdown() {
        let state = SecurityState::default();
        let (tx, rx) = tokio::sync::watch::channel(false);
        let handles = state.start_cleanup_tasks(rx);
        tx.send(true).unwrap();
        for handle in handles {
            tokio::time::timeout(std::time::Duration::from_secs(5), handle)
                .await
                .unwrap()
                .unwrap();
        }
    }
}
