//! Realtime push over WebSocket.
//!
//! [`PushHub`] implements the core [`PushChannel`] on top of a
//! `tokio::sync::broadcast` channel. Every connected socket holds a receiver
//! and forwards only the events addressed to it: its own user room, and the
//! `/admin` namespace when the token carries the admin role.
//!
//! Clients connect to `/ws?token=<access token>` and receive frames shaped as
//! `{"event": "...", "data": {...}}`.

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::broadcast::{self, error::RecvError};
use videmaison::{Claims, PushChannel, PushTarget, RepositoryProvider};
use videmaison_core::push::ADMIN_NAMESPACE;

use crate::{AppState, error::ApiError};

const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct PushEvent {
    pub event: String,
    pub data: Value,
    pub target: PushTarget,
}

impl PushEvent {
    fn frame(&self) -> String {
        json!({ "event": self.event, "data": self.data }).to_string()
    }
}

pub struct PushHub {
    sender: broadcast::Sender<Arc<PushEvent>>,
}

impl PushHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PushEvent>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for PushHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl PushChannel for PushHub {
    fn emit(&self, event: &str, payload: Value, target: PushTarget) {
        let event = Arc::new(PushEvent {
            event: event.to_string(),
            data: payload,
            target,
        });

        if self.sender.send(event).is_err() {
            tracing::trace!("No connected sockets, push event dropped");
        }
    }
}

/// What one socket is allowed to receive.
#[derive(Debug, Clone)]
pub struct Subscription {
    user_id: String,
    is_admin: bool,
    rooms: HashSet<String>,
}

impl Subscription {
    pub fn for_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            is_admin: claims.is_admin(),
            rooms: HashSet::from([claims.sub.clone()]),
        }
    }

    /// Only the caller's own room may be joined.
    pub fn join(&mut self, room: &str) -> bool {
        if room != self.user_id {
            return false;
        }
        self.rooms.insert(room.to_string());
        true
    }

    pub fn accepts(&self, target: &PushTarget) -> bool {
        match target {
            PushTarget::Room(room) => self.rooms.contains(room),
            PushTarget::Namespace(ns) => ns == ADMIN_NAMESPACE && self.is_admin,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientFrame {
    event: String,
    #[serde(default)]
    user_id: Option<String>,
}

pub async fn ws_handler<R>(
    State(state): State<AppState<R>>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response
where
    R: RepositoryProvider,
{
    let claims = match query
        .token
        .as_deref()
        .map(|token| state.app.auth().authenticate(token))
    {
        Some(Ok(claims)) => claims,
        Some(Err(e)) => return ApiError::from(e).into_response(),
        None => return ApiError::Unauthorized.into_response(),
    };

    let subscription = Subscription::for_claims(&claims);
    let receiver = state.push.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, subscription, receiver))
}

async fn handle_socket(
    socket: WebSocket,
    mut subscription: Subscription,
    mut events: broadcast::Receiver<Arc<PushEvent>>,
) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    tracing::debug!(user_id = %subscription.user_id, "WebSocket connected");

    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    if !subscription.accepts(&event.target) {
                        continue;
                    }
                    if ws_sender.send(Message::Text(event.frame().into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %subscription.user_id, skipped, "WebSocket lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = handle_client_frame(&mut subscription, text.as_str()) {
                        if ws_sender.send(Message::Text(reply.into())).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!(user_id = %subscription.user_id, "WebSocket disconnected");
}

fn handle_client_frame(subscription: &mut Subscription, text: &str) -> Option<String> {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(_) => {
            tracing::debug!("Ignoring malformed WebSocket frame");
            return None;
        }
    };

    match frame.event.as_str() {
        "join" => {
            let room = frame.user_id.unwrap_or_default();
            if subscription.join(&room) {
                Some(json!({ "event": "joined", "data": { "room": room } }).to_string())
            } else {
                tracing::warn!(user_id = %subscription.user_id, room = %room, "Refused join for another user's room");
                Some(
                    json!({ "event": "error", "data": { "message": "Cannot join another user's room" } })
                        .to_string(),
                )
            }
        }
        _ => None,
    }
}
