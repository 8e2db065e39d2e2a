//! Per-client sliding-window rate limiting with optional escalation to a block.
//!
//! Each key (normally a client IP, optionally scoped by endpoint) owns an
//! ordered list of admitted request timestamps and an optional block entry.
//!
//! Evaluation order for a request at `now`:
//!
//! 1. An unexpired block rejects immediately without touching the window.
//!    An expired block is dropped (lazy expiry).
//! 2. Timestamps older than `now - window` are pruned.
//! 3. If `max_requests` or more remain the request is rejected. With a
//!    `block_duration` configured the key is blocked until `now + block_duration`.
//!    The rejected request is never recorded.
//! 4. Otherwise `now` is appended and the request is admitted.
//!
//! The read-modify-write for one key runs under that key's map entry lock.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::error::RateLimitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: usize,
    pub window: Duration,
    /// `None` disables escalation: over-limit requests are simply rejected.
    pub block_duration: Option<Duration>,
}

impl RateLimitPolicy {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            block_duration: None,
        }
    }

    pub fn with_block(mut self, block_duration: Duration) -> Self {
        self.block_duration = Some(block_duration);
        self
    }

    /// Coarse per-IP limit for the public API: 60 per hour, then a 30 minute block.
    pub fn general_api() -> Self {
        Self::new(60, Duration::seconds(3600)).with_block(Duration::seconds(1800))
    }

    pub fn registration() -> Self {
        Self::new(3, Duration::seconds(300))
    }

    pub fn login() -> Self {
        Self::new(5, Duration::seconds(300))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// Over the limit without escalation.
    Limited { retry_after: Duration },
    /// Over the limit; the key has just been blocked.
    Escalated { retry_after: Duration },
    /// Rejected by an existing block.
    Blocked { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }

    /// Retry hint in whole seconds, rounded up. `None` when allowed.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            RateLimitDecision::Allowed => None,
            RateLimitDecision::Limited { retry_after }
            | RateLimitDecision::Escalated { retry_after }
            | RateLimitDecision::Blocked { retry_after } => Some(ceil_seconds(*retry_after)),
        }
    }

    pub fn into_result(self) -> Result<(), RateLimitError> {
        let retry_after_seconds = self.retry_after_seconds().unwrap_or_default();
        match self {
            RateLimitDecision::Allowed => Ok(()),
            RateLimitDecision::Limited { .. } => Err(RateLimitError::TooManyRequests {
                retry_after_seconds,
            }),
            RateLimitDecision::Escalated { .. } => Err(RateLimitError::Escalated {
                retry_after_seconds,
            }),
            RateLimitDecision::Blocked { .. } => Err(RateLimitError::Blocked {
                retry_after_seconds,
            }),
        }
    }
}

fn ceil_seconds(duration: Duration) -> u64 {
    let millis = duration.num_milliseconds().max(0) as u64;
    millis.div_ceil(1000).max(1)
}

#[derive(Debug)]
struct ClientWindow {
    hits: VecDeque<DateTime<Utc>>,
    blocked_until: Option<DateTime<Utc>>,
    window: Duration,
}

impl Default for ClientWindow {
    fn default() -> Self {
        Self {
            hits: VecDeque::new(),
            blocked_until: None,
            window: Duration::zero(),
        }
    }
}

impl ClientWindow {
    fn prune(&mut self, now: DateTime<Utc>, window: Duration) {
        let cutoff = now - window;
        while self.hits.front().is_some_and(|t| *t < cutoff) {
            self.hits.pop_front();
        }
    }

    fn is_idle(&self, now: DateTime<Utc>) -> bool {
        let blocked = self.blocked_until.is_some_and(|until| now < until);
        let recent = self.hits.back().is_some_and(|t| *t >= now - self.window);
        !blocked && !recent
    }
}

pub struct RateLimiter {
    clients: DashMap<String, ClientWindow>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            clients: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Evaluate `key` against the configured policy.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Utc::now())
    }

    pub fn check_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        self.evaluate(key, self.policy.max_requests, self.policy.window, now)
    }

    /// Admission check with explicit limits; escalation follows the policy's
    /// `block_duration`.
    pub fn allow(&self, key: &str, max_requests: usize, window: Duration) -> bool {
        self.allow_at(key, max_requests, window, Utc::now())
    }

    pub fn allow_at(
        &self,
        key: &str,
        max_requests: usize,
        window: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        self.evaluate(key, max_requests, window, now).is_allowed()
    }

    /// Block expiry for `key` if one is in force at `now`. Read-only.
    pub fn blocked_until(&self, key: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.clients
            .get(key)
            .and_then(|client| client.blocked_until)
            .filter(|until| now < *until)
    }

    fn evaluate(
        &self,
        key: &str,
        max_requests: usize,
        window: Duration,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let mut client = self.clients.entry(key.to_string()).or_default();
        client.window = window;

        if let Some(until) = client.blocked_until {
            if now < until {
                return RateLimitDecision::Blocked {
                    retry_after: until - now,
                };
            }
            client.blocked_until = None;
        }

        client.prune(now, window);

        if client.hits.len() >= max_requests {
            return match self.policy.block_duration {
                Some(block_duration) => {
                    client.blocked_until = Some(now + block_duration);
                    tracing::warn!(
                        key = %key,
                        block_seconds = block_duration.num_seconds(),
                        "Client blocked for rate limit violation"
                    );
                    RateLimitDecision::Escalated {
                        retry_after: block_duration,
                    }
                }
                None => {
                    let retry_after = client
                        .hits
                        .front()
                        .map(|oldest| window - (now - *oldest))
                        .unwrap_or(window);
                    tracing::debug!(key = %key, "Request rejected by rate limiter");
                    RateLimitDecision::Limited { retry_after }
                }
            };
        }

        client.hits.push_back(now);
        RateLimitDecision::Allowed
    }

    /// Drops keys with no recent requests and no active block. Admission
    /// decisions are unaffected.
    pub fn prune_idle(&self, now: DateTime<Utc>) -> usize {
        let before = self.clients.len();
        self.clients.retain(|_, client| !client.is_idle(now));
        before.saturating_sub(self.clients.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.clients.len()
    }

    pub fn reset(&self) {
        self.clients.clear();
    }

    /// Periodically runs [`prune_idle`](Self::prune_idle) until `shutdown` flips to `true`.
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
                        let removed = self.prune_idle(Utc::now());
                        if removed > 0 {
                            tracing::info!(count = removed, "Pruned idle rate limiter entries");
                        }
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            tracing::info!("Rate limiter cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_six_calls_escalate_to_block() {
        let limiter = RateLimiter::new(
            RateLimitPolicy::new(5, Duration::seconds(300)).with_block(Duration::seconds(1800)),
        );
        let window = Duration::seconds(300);

        let results: Vec<bool> = (0..6)
            .map(|i| limiter.allow_at("1.2.3.4", 5, window, t0() + Duration::seconds(i * 2)))
            .collect();
        assert_eq!(results, vec![true, true, true, true, true, false]);

        let blocked_at = t0() + Duration::seconds(10);
        assert_eq!(
            limiter.blocked_until("1.2.3.4", blocked_at),
            Some(blocked_at + Duration::seconds(1800))
        );
    }

    #[test]
    fn test_nth_plus_one_rejected() {
        let limiter = RateLimiter::new(RateLimitPolicy::new(3, Duration::seconds(60)));
        for i in 0..3 {
            assert!(limiter.check_at("k", t0() + Duration::seconds(i)).is_allowed());
        }
        let decision = limiter.check_at("k", t0() + Duration::seconds(3));
        assert!(matches!(decision, RateLimitDecision::Limited { .. }));
        // first hit at t0 leaves the window at t0 + 60
        assert_eq!(decision.retry_after_seconds(), Some(57));
    }

    #[test]
    fn test_block_short_circuits_window() {
        let limiter = RateLimiter::new(
            RateLimitPolicy::new(2, Duration::seconds(10)).with_block(Duration::seconds(100)),
        );
        assert!(limiter.check_at("ip", t0()).is_allowed());
        assert!(limiter.check_at("ip", t0()).is_allowed());
        assert!(matches!(
            limiter.check_at("ip", t0()),
            RateLimitDecision::Escalated { .. }
        ));

        // window has long emptied, but the block is still in force
        let later = t0() + Duration::seconds(50);
        let decision = limiter.check_at("ip", later);
        assert_eq!(
            decision,
            RateLimitDecision::Blocked {
                retry_after: Duration::seconds(50)
            }
        );

        // expired block is cleared and the window starts over
        let after_block = t0() + Duration::seconds(100);
        assert!(limiter.check_at("ip", after_block).is_allowed());
        assert_eq!(limiter.blocked_until("ip", after_block), None);
    }

    #[test]
    fn test_non_escalating_policy_never_blocks() {
        let limiter = RateLimiter::new(RateLimitPolicy::login());
        for _ in 0..5 {
            assert!(limiter.check_at("login:10.0.0.1", t0()).is_allowed());
        }
        for _ in 0..3 {
            assert!(matches!(
                limiter.check_at("login:10.0.0.1", t0()),
                RateLimitDecision::Limited { .. }
            ));
        }
        assert_eq!(limiter.blocked_until("login:10.0.0.1", t0()), None);

        // rejected requests were not recorded, so the window frees up on schedule
        assert!(
            limiter
                .check_at("login:10.0.0.1", t0() + Duration::seconds(301))
                .is_allowed()
        );
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let limiter = RateLimiter::new(RateLimitPolicy::new(1, Duration::seconds(300)));
        assert!(limiter.check_at("k", t0()).is_allowed());
        // exactly `window` later the first hit is still inside [now - window, now]
        assert!(
            !limiter
                .check_at("k", t0() + Duration::seconds(300))
                .is_allowed()
        );
        assert!(
            limiter
                .check_at("k", t0() + Duration::seconds(301))
                .is_allowed()
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new(RateLimitPolicy::new(1, Duration::seconds(60)));
        assert!(limiter.check_at("a", t0()).is_allowed());
        assert!(limiter.check_at("b", t0()).is_allowed());
        assert!(!limiter.check_at("a", t0()).is_allowed());
    }

    #[test]
    fn test_decision_into_result() {
        let err = RateLimitDecision::Blocked {
            retry_after: Duration::milliseconds(1500),
        }
        .into_result()
        .unwrap_err();
        assert_eq!(
            err,
            RateLimitError::Blocked {
                retry_after_seconds: 2
            }
        );
        assert!(RateLimitDecision::Allowed.into_result().is_ok());
    }

    #[test]
    fn test_prune_idle_keeps_blocked_and_recent() {
        let limiter = RateLimiter::new(
            RateLimitPolicy::new(1, Duration::seconds(60)).with_block(Duration::seconds(600)),
        );
        limiter.check_at("quiet", t0());
        limiter.check_at("blocked", t0());
        limiter.check_at("blocked", t0());

        let removed = limiter.prune_idle(t0() + Duration::seconds(120));
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_keys(), 1);
        assert!(
            limiter
                .blocked_until("blocked", t0() + Duration::seconds(120))
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_concurrent_requests_respect_cap() {
        let limiter = Arc::new(RateLimiter::new(RateLimitPolicy::new(
            10,
            Duration::seconds(60),
        )));
        let now = t0();

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move { limiter.check_at("shared", now).is_allowed() })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }
}
