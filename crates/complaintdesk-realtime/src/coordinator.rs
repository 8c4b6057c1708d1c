//! Realtime coordinator: connection lifecycle, presence, and event dispatch.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

use complaintdesk_auth::{TokenVerifier, VerifyError};
use complaintdesk_core::config::RealtimeConfig;

use crate::connection::{ConnectionHandle, ConnectionId, ConnectionPool};
use crate::error::RealtimeError;
use crate::message::{InboundEvent, OutboundEvent};
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::presence::PresenceRegistry;
use crate::room::RoomRouter;

/// Credentials and parameters presented when a connection opens.
#[derive(Debug, Clone, Default)]
pub struct HandshakeRequest {
    /// Bearer token.
    pub token: Option<String>,
    /// User id to register as online. Independent of the token subject
    /// unless `presence_requires_verified_identity` is set.
    pub user_id: Option<String>,
}

/// A connection that passed the handshake.
#[derive(Debug)]
pub struct EstablishedConnection {
    /// The registered handle.
    pub handle: Arc<ConnectionHandle>,
    /// Outbound queue to drain into the socket.
    pub outbound: mpsc::Receiver<OutboundEvent>,
}

/// Owns the connection pool, the presence registry, and the room router.
pub struct RealtimeCoordinator {
    verifier: TokenVerifier,
    pool: Arc<ConnectionPool>,
    router: RoomRouter,
    presence: Mutex<PresenceRegistry>,
    metrics: RealtimeMetrics,
    config: RealtimeConfig,
}

impl std::fmt::Debug for RealtimeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeCoordinator")
            .field("connections", &self.pool.connection_count())
            .field("rooms", &self.router.room_count())
            .finish()
    }
}

impl RealtimeCoordinator {
    /// Creates a coordinator with empty presence and no rooms.
    pub fn new(config: RealtimeConfig, verifier: TokenVerifier) -> Self {
        let pool = Arc::new(ConnectionPool::new());
        info!(
            outbound_buffer_size = config.outbound_buffer_size,
            presence_requires_verified_identity = config.presence_requires_verified_identity,
            "Realtime coordinator initialized"
        );
        Self {
            verifier,
            router: RoomRouter::new(pool.clone()),
            pool,
            presence: Mutex::new(PresenceRegistry::new()),
            metrics: RealtimeMetrics::new(),
            config,
        }
    }

    /// Authenticates and registers a new connection.
    ///
    /// On refusal nothing is registered and no event is sent.
    pub async fn handshake(
        &self,
        request: HandshakeRequest,
    ) -> Result<EstablishedConnection, RealtimeError> {
        let identity = match self.verifier.verify(request.token.as_deref()).await {
            Ok(identity) => identity,
            Err(e) => {
                self.metrics.handshake_refused();
                if let VerifyError::Lookup(cause) = &e {
                    error!(error = %cause, "Identity lookup failed during handshake");
                } else {
                    debug!(reason = %e, "Realtime handshake refused");
                }
                return Err(e.into());
            }
        };

        let (tx, outbound) = mpsc::channel(self.config.outbound_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(identity, tx));
        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            user_id = %handle.identity.user_id,
            "Realtime connection registered"
        );

        if let Some(user_id) = request.user_id.filter(|id| !id.is_empty()) {
            if self.config.presence_requires_verified_identity
                && user_id != handle.identity.user_id.to_string()
            {
                warn!(
                    conn_id = %handle.id,
                    claimed = %user_id,
                    "Presence id does not match token subject, not registering"
                );
            } else {
                let mut presence = self.presence.lock().await;
                presence.set(user_id, handle.id);
                self.announce_presence(&presence);
            }
        }

        Ok(EstablishedConnection { handle, outbound })
    }

    /// Handles one inbound text frame. Malformed frames are logged and dropped.
    pub fn handle_text(&self, conn_id: ConnectionId, frame: &str) -> Result<(), RealtimeError> {
        self.metrics.event_received();
        match InboundEvent::parse(frame) {
            Ok(event) => {
                self.dispatch(conn_id, event);
                Ok(())
            }
            Err(e) => {
                self.metrics.event_malformed();
                warn!(conn_id = %conn_id, error = %e, "Dropping malformed event");
                Err(e)
            }
        }
    }

    /// Applies a decoded inbound event on behalf of `conn_id`.
    pub fn dispatch(&self, conn_id: ConnectionId, event: InboundEvent) {
        debug!(conn_id = %conn_id, event = event.name(), "Inbound event");
        match event {
            InboundEvent::JoinRoom(room) => {
                if self.router.join(conn_id, &room) {
                    debug!(conn_id = %conn_id, room = %room, "Joined room");
                }
            }
            InboundEvent::Typing(payload) => {
                let room = payload.room.clone();
                self.fan_out(&room, OutboundEvent::Typing(payload));
            }
            InboundEvent::NewMessage(payload) => {
                self.fan_out(&payload.room, OutboundEvent::NewMessage(payload.message));
            }
        }
    }

    /// Tears down a connection: leaves its rooms, clears its presence entry,
    /// and announces the new online list if it changed.
    pub async fn disconnect(&self, conn_id: ConnectionId) {
        let Some(handle) = self.pool.remove(&conn_id) else {
            return;
        };
        handle.mark_dead();
        self.router.leave_all(conn_id);
        self.metrics.connection_closed();

        let mut presence = self.presence.lock().await;
        if presence.remove(conn_id) {
            self.announce_presence(&presence);
        }
        drop(presence);

        info!(
            conn_id = %conn_id,
            user_id = %handle.identity.user_id,
            "Realtime connection closed"
        );
    }

    /// Currently online user ids, in first-registration order.
    pub async fn online_user_ids(&self) -> Vec<String> {
        self.presence.lock().await.list_user_ids()
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// The room router, for inspection.
    pub fn rooms(&self) -> &RoomRouter {
        &self.router
    }

    fn announce_presence(&self, presence: &PresenceRegistry) {
        let event = OutboundEvent::OnlineUsers(presence.list_user_ids());
        let delivery = self.router.broadcast_all(&event);
        self.metrics
            .record_delivery(delivery.delivered, delivery.dropped);
    }

    fn fan_out(&self, room: &str, event: OutboundEvent) {
        let delivery = self.router.broadcast(room, &event);
        self.metrics
            .record_delivery(delivery.delivered, delivery.dropped);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use complaintdesk_auth::jwt::{Claims, JwtDecoder, JwtEncoder};
    use complaintdesk_auth::{Identity, IdentityStore};
    use complaintdesk_core::config::AuthConfig;
    use complaintdesk_core::result::AppResult;
    use complaintdesk_entity::user::UserRole;

    use super::*;

    struct MemoryStore(HashMap<Uuid, Identity>);

    #[async_trait]
    impl IdentityStore for MemoryStore {
        async fn find_identity(&self, user_id: Uuid) -> AppResult<Option<Identity>> {
            Ok(self.0.get(&user_id).cloned())
        }
    }

    struct Fixture {
        coordinator: RealtimeCoordinator,
        encoder: JwtEncoder,
        users: Vec<Identity>,
    }

    impl Fixture {
        fn new(config: RealtimeConfig) -> Self {
            let auth = AuthConfig {
                jwt_secret: "realtime-test".to_string(),
                ..AuthConfig::default()
            };
            let users: Vec<Identity> = ["Asha", "Bilal", "Chen"]
                .into_iter()
                .map(|name| Identity {
                    user_id: Uuid::new_v4(),
                    display_name: name.to_string(),
                    role: UserRole::User,
                })
                .collect();
            let store = MemoryStore(users.iter().map(|u| (u.user_id, u.clone())).collect());
            let verifier = TokenVerifier::new(JwtDecoder::new(&auth), Arc::new(store));
            Self {
                coordinator: RealtimeCoordinator::new(config, verifier),
                encoder: JwtEncoder::new(&auth),
                users,
            }
        }

        fn token(&self, user: usize, ttl: Duration) -> String {
            let now = Utc::now();
            let identity = &self.users[user];
            self.encoder
                .sign(&Claims {
                    sub: identity.user_id,
                    name: identity.display_name.clone(),
                    role: identity.role,
                    iat: now.timestamp(),
                    exp: (now + ttl).timestamp(),
                })
                .unwrap()
        }

        async fn connect(&self, user: usize, presence_id: Option<&str>) -> EstablishedConnection {
            self.coordinator
                .handshake(HandshakeRequest {
                    token: Some(self.token(user, Duration::hours(1))),
                    user_id: presence_id.map(str::to_string),
                })
                .await
                .unwrap()
        }
    }

    fn drain(rx: &mut mpsc::Receiver<OutboundEvent>) -> Vec<OutboundEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn online(ids: &[&str]) -> OutboundEvent {
        OutboundEvent::OnlineUsers(ids.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn test_connect_join_and_message_fan_out() {
        let fx = Fixture::new(RealtimeConfig::default());

        let mut a = fx.connect(0, Some("A")).await;
        assert_eq!(drain(&mut a.outbound), vec![online(&["A"])]);

        let mut b = fx.connect(1, Some("B")).await;
        assert_eq!(drain(&mut a.outbound), vec![online(&["A", "B"])]);
        assert_eq!(drain(&mut b.outbound), vec![online(&["A", "B"])]);

        fx.coordinator
            .handle_text(a.handle.id, r#"{"event":"joinRoom","data":"c1"}"#)
            .unwrap();
        fx.coordinator
            .handle_text(b.handle.id, r#"{"event":"joinRoom","data":"c1"}"#)
            .unwrap();

        let frame = json!({
            "event": "newMessage",
            "data": {"room": "c1", "message": {"text": "hi"}}
        })
        .to_string();
        fx.coordinator.handle_text(a.handle.id, &frame).unwrap();

        let expected = OutboundEvent::NewMessage(json!({"text": "hi"}));
        assert_eq!(drain(&mut a.outbound), vec![expected.clone()]);
        assert_eq!(drain(&mut b.outbound), vec![expected]);
    }

    #[tokio::test]
    async fn test_expired_token_is_refused_without_side_effects() {
        let fx = Fixture::new(RealtimeConfig::default());
        let mut watcher = fx.connect(0, None).await;

        let err = fx
            .coordinator
            .handshake(HandshakeRequest {
                token: Some(fx.token(1, Duration::hours(-1))),
                user_id: Some("B".to_string()),
            })
            .await
            .unwrap_err();

        assert_eq!(err.tag(), "AUTH_ERROR");
        assert_eq!(fx.coordinator.connection_count(), 1);
        assert!(fx.coordinator.online_user_ids().await.is_empty());
        assert!(drain(&mut watcher.outbound).is_empty());
        assert_eq!(fx.coordinator.metrics().handshakes_refused, 1);
    }

    #[tokio::test]
    async fn test_missing_token_and_unknown_user_are_refused() {
        let fx = Fixture::new(RealtimeConfig::default());

        let missing = fx
            .coordinator
            .handshake(HandshakeRequest::default())
            .await
            .unwrap_err();
        assert_eq!(missing.tag(), "AUTH_ERROR");

        let now = Utc::now();
        let ghost = fx
            .encoder
            .sign(&Claims {
                sub: Uuid::new_v4(),
                name: "Ghost".to_string(),
                role: UserRole::User,
                iat: now.timestamp(),
                exp: (now + Duration::hours(1)).timestamp(),
            })
            .unwrap();
        let not_found = fx
            .coordinator
            .handshake(HandshakeRequest {
                token: Some(ghost),
                user_id: Some("ghost".to_string()),
            })
            .await
            .unwrap_err();
        assert_eq!(not_found.tag(), "NOT_FOUND");
        assert_eq!(fx.coordinator.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_disconnect_announces_remaining_users() {
        let fx = Fixture::new(RealtimeConfig::default());
        let a = fx.connect(0, Some("A")).await;
        let mut b = fx.connect(1, Some("B")).await;
        drain(&mut b.outbound);

        fx.coordinator.disconnect(a.handle.id).await;

        assert_eq!(drain(&mut b.outbound), vec![online(&["B"])]);
        assert_eq!(fx.coordinator.online_user_ids().await, vec!["B"]);
        assert!(!a.handle.is_alive());
    }

    #[tokio::test]
    async fn test_stale_connection_disconnect_keeps_user_online() {
        let fx = Fixture::new(RealtimeConfig::default());
        let first = fx.connect(0, Some("U")).await;
        let mut second = fx.connect(0, Some("U")).await;
        drain(&mut second.outbound);

        fx.coordinator.disconnect(first.handle.id).await;

        assert_eq!(fx.coordinator.online_user_ids().await, vec!["U"]);
        assert!(drain(&mut second.outbound).is_empty());

        fx.coordinator.disconnect(second.handle.id).await;
        assert!(fx.coordinator.online_user_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_typing_echoes_to_sender_and_room() {
        let fx = Fixture::new(RealtimeConfig::default());
        let mut a = fx.connect(0, None).await;
        let mut b = fx.connect(1, None).await;
        let mut outsider = fx.connect(2, None).await;

        fx.coordinator
            .dispatch(a.handle.id, InboundEvent::JoinRoom("c9".to_string()));
        fx.coordinator
            .dispatch(b.handle.id, InboundEvent::JoinRoom("c9".to_string()));

        let frame = json!({"event": "typing", "data": {"room": "c9", "name": "Asha"}}).to_string();
        fx.coordinator.handle_text(a.handle.id, &frame).unwrap();

        assert_eq!(drain(&mut a.outbound).len(), 1);
        let received = drain(&mut b.outbound);
        match received.as_slice() {
            [OutboundEvent::Typing(payload)] => {
                assert_eq!(payload.room, "c9");
                assert_eq!(payload.extra.get("name"), Some(&json!("Asha")));
            }
            other => panic!("unexpected events: {other:?}"),
        }
        assert!(drain(&mut outsider.outbound).is_empty());
    }

    #[tokio::test]
    async fn test_malformed_frame_keeps_connection() {
        let fx = Fixture::new(RealtimeConfig::default());
        let a = fx.connect(0, Some("A")).await;

        let err = fx
            .coordinator
            .handle_text(a.handle.id, "{\"event\":\"joinRoom\"")
            .unwrap_err();
        assert_eq!(err.tag(), "MALFORMED_EVENT");
        assert_eq!(fx.coordinator.connection_count(), 1);
        assert!(a.handle.is_alive());
        assert_eq!(fx.coordinator.metrics().events_malformed, 1);
    }

    #[tokio::test]
    async fn test_presence_can_require_matching_subject() {
        let fx = Fixture::new(RealtimeConfig {
            presence_requires_verified_identity: true,
            ..RealtimeConfig::default()
        });

        let mut spoofed = fx.connect(0, Some("someone-else")).await;
        assert!(drain(&mut spoofed.outbound).is_empty());
        assert!(fx.coordinator.online_user_ids().await.is_empty());

        let own_id = fx.users[1].user_id.to_string();
        let _b = fx.connect(1, Some(&own_id)).await;
        assert_eq!(fx.coordinator.online_user_ids().await, vec![own_id]);
    }
}
