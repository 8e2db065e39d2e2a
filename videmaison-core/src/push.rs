//! Fire-and-forget realtime notifications.
//!
//! The core only describes *what* to push and *to whom*; the HTTP layer decides
//! how frames reach connected clients.

use serde_json::Value;

/// Addressing for a pushed event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PushTarget {
    /// A per-user room, keyed by user id.
    Room(String),
    /// Every subscriber of a namespace, e.g. `/admin`.
    Namespace(String),
}

impl PushTarget {
    pub fn room(id: impl Into<String>) -> Self {
        PushTarget::Room(id.into())
    }

    pub fn admin() -> Self {
        PushTarget::Namespace(ADMIN_NAMESPACE.to_string())
    }
}

pub const ADMIN_NAMESPACE: &str = "/admin";

pub trait PushChannel: Send + Sync + 'static {
    /// Must not block; dropping the event is acceptable when nobody listens.
    fn emit(&self, event: &str, payload: Value, target: PushTarget);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPushChannel;

impl PushChannel for NoopPushChannel {
    fn emit(&self, event: &str, _payload: Value, target: PushTarget) {
        tracing::trace!(event = %event, target = ?target, "Push channel disabled, dropping event");
    }
}
