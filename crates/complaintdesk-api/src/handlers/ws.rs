//! WebSocket upgrade handler.

use axum::Json;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use complaintdesk_core::http::ApiErrorResponse;
use complaintdesk_realtime::{EstablishedConnection, HandshakeRequest, RealtimeError};

use crate::dto::request::WsQuery;
use crate::extractors::bearer_token;
use crate::state::AppState;

/// GET /ws?token={jwt}&userId={id}
///
/// Only a valid upgrade request reaches the handshake. A refused client gets
/// HTTP 401 and no realtime event.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let ws = match upgrade {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let token = query
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(&headers).map(str::to_string));

    let request = HandshakeRequest {
        token,
        user_id: query.user_id,
    };

    let established = match state.realtime.handshake(request).await {
        Ok(established) => established,
        Err(e) => return refusal(&e),
    };

    let conn_id = established.handle.id;
    let failed_state = state.clone();
    ws.on_failed_upgrade(move |e| {
        warn!(conn_id = %conn_id, error = %e, "WebSocket upgrade failed");
        tokio::spawn(async move { failed_state.realtime.disconnect(conn_id).await });
    })
    .on_upgrade(move |socket| serve_connection(state, established, socket))
}

fn refusal(err: &RealtimeError) -> Response {
    let status = if err.refuses_handshake() {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ApiErrorResponse::new(err.tag(), err.to_string())),
    )
        .into_response()
}

/// Pumps frames between the socket and the coordinator until either side closes.
async fn serve_connection(state: AppState, established: EstablishedConnection, socket: WebSocket) {
    let EstablishedConnection {
        handle,
        mut outbound,
    } = established;
    let conn_id = handle.id;
    let (mut ws_tx, mut ws_rx) = socket.split();

    info!(
        conn_id = %conn_id,
        user_id = %handle.identity.user_id,
        "WebSocket connection established"
    );

    let outbound_task = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let frame = match event.to_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(conn_id = %conn_id, error = %e, "Failed to encode outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Err(e) = state.realtime.handle_text(conn_id, text.as_str()) {
                    debug!(conn_id = %conn_id, error = %e, "Inbound frame dropped");
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.realtime.disconnect(conn_id).await;
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use futures::{SinkExt, StreamExt};
    use serde_json::{Value, json};
    use tokio_tungstenite::tungstenite;
    use tower::ServiceExt;
    use uuid::Uuid;

    use complaintdesk_auth::{Claims, Identity, IdentityStore, JwtDecoder, JwtEncoder, TokenVerifier};
    use complaintdesk_core::config::AppConfig;
    use complaintdesk_core::result::AppResult;
    use complaintdesk_entity::user::UserRole;
    use complaintdesk_realtime::{OutboundEvent, RealtimeCoordinator};

    use super::*;
    use crate::app::{build_app, build_state};

    const TEST_CONFIG: &str = r#"
        [database]
        url = "postgres://localhost:5432/complaintdesk_test"

        [auth]
        jwt_secret = "ws-test-secret"
    "#;

    struct MemoryStore(HashMap<Uuid, Identity>);

    #[async_trait]
    impl IdentityStore for MemoryStore {
        async fn find_identity(&self, user_id: Uuid) -> AppResult<Option<Identity>> {
            Ok(self.0.get(&user_id).cloned())
        }
    }

    struct Fixture {
        state: AppState,
        encoder: JwtEncoder,
        users: Vec<Identity>,
    }

    impl Fixture {
        /// App state whose realtime coordinator resolves identities from memory.
        fn new() -> Self {
            let config = AppConfig::from_toml_str(TEST_CONFIG).unwrap();
            let pool = sqlx::PgPool::connect_lazy(&config.database.url).unwrap();
            let users: Vec<Identity> = ["Asha", "Bilal"]
                .into_iter()
                .map(|name| Identity {
                    user_id: Uuid::new_v4(),
                    display_name: name.to_string(),
                    role: UserRole::User,
                })
                .collect();
            let store = MemoryStore(users.iter().map(|u| (u.user_id, u.clone())).collect());
            let verifier = TokenVerifier::new(JwtDecoder::new(&config.auth), Arc::new(store));
            let realtime = Arc::new(RealtimeCoordinator::new(config.realtime.clone(), verifier));
            let encoder = JwtEncoder::new(&config.auth);

            let mut state = build_state(config, pool).unwrap();
            state.realtime = realtime;
            Self {
                state,
                encoder,
                users,
            }
        }

        fn token_for(&self, user_id: Uuid, ttl: chrono::Duration) -> String {
            let now = Utc::now();
            self.encoder
                .sign(&Claims {
                    sub: user_id,
                    name: "test".to_string(),
                    role: UserRole::User,
                    iat: now.timestamp(),
                    exp: (now + ttl).timestamp(),
                })
                .unwrap()
        }

        fn token(&self, user: usize) -> String {
            self.token_for(self.users[user].user_id, chrono::Duration::hours(1))
        }

        /// A connection registered directly with the coordinator, with its
        /// initial presence announcement already drained.
        async fn watcher(&self) -> EstablishedConnection {
            let mut conn = self
                .state
                .realtime
                .handshake(HandshakeRequest {
                    token: Some(self.token(0)),
                    user_id: Some("A".to_string()),
                })
                .await
                .unwrap();
            assert_eq!(
                conn.outbound.try_recv().unwrap(),
                OutboundEvent::OnlineUsers(vec!["A".to_string()])
            );
            conn
        }

        async fn serve(&self) -> SocketAddr {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let app = build_app(self.state.clone());
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            addr
        }
    }

    /// Sends an upgrade request over HTTP and returns the refusal.
    async fn refused_upgrade(addr: SocketAddr, query: &str) -> (StatusCode, Value) {
        let response = reqwest::Client::new()
            .get(format!("http://{addr}/ws?{query}"))
            .header("connection", "upgrade")
            .header("upgrade", "websocket")
            .header("sec-websocket-version", "13")
            .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn next_json<S>(stream: &mut S) -> Value
    where
        S: futures::Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Unpin,
    {
        let message = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        serde_json::from_str(message.to_text().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_plain_get_with_valid_token_leaves_presence_untouched() {
        let fixture = Fixture::new();
        let mut watcher = fixture.watcher().await;

        let request = Request::builder()
            .uri(format!("/ws?token={}&userId=X", fixture.token(1)))
            .body(Body::empty())
            .unwrap();
        let response = build_app(fixture.state.clone()).oneshot(request).await.unwrap();

        assert!(response.status().is_client_error());
        assert!(watcher.outbound.try_recv().is_err());
        assert_eq!(fixture.state.realtime.online_user_ids().await, vec!["A"]);
        assert_eq!(fixture.state.realtime.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_valid_handshake_switches_protocols() {
        let fixture = Fixture::new();
        let addr = fixture.serve().await;

        let url = format!("ws://{addr}/ws?token={}&userId=A", fixture.token(0));
        let (mut socket, response) = tokio_tungstenite::connect_async(url).await.unwrap();
        assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
        assert_eq!(
            next_json(&mut socket).await,
            json!({ "event": "onlineUsers", "data": ["A"] })
        );

        socket
            .send(tungstenite::Message::text(
                r#"{"event":"joinRoom","data":"c1"}"#,
            ))
            .await
            .unwrap();
        socket
            .send(tungstenite::Message::text("not json"))
            .await
            .unwrap();
        socket
            .send(tungstenite::Message::text(
                r#"{"event":"newMessage","data":{"room":"c1","message":{"text":"hi"}}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(
            next_json(&mut socket).await,
            json!({ "event": "newMessage", "data": { "text": "hi" } })
        );
    }

    #[tokio::test]
    async fn test_token_from_authorization_header() {
        use tungstenite::client::IntoClientRequest;

        let fixture = Fixture::new();
        let addr = fixture.serve().await;

        let mut request = format!("ws://{addr}/ws?userId=B")
            .into_client_request()
            .unwrap();
        request.headers_mut().insert(
            "authorization",
            format!("Bearer {}", fixture.token(1)).parse().unwrap(),
        );
        let (mut socket, _) = tokio_tungstenite::connect_async(request).await.unwrap();
        assert_eq!(
            next_json(&mut socket).await,
            json!({ "event": "onlineUsers", "data": ["B"] })
        );
    }

    #[tokio::test]
    async fn test_refusals_carry_error_tag_and_announce_nothing() {
        let fixture = Fixture::new();
        let mut watcher = fixture.watcher().await;
        let addr = fixture.serve().await;

        let (status, body) = refused_upgrade(addr, "userId=X").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "AUTH_ERROR");
        assert_eq!(body["message"], "Authentication token missing");

        let expired = fixture.token_for(fixture.users[1].user_id, chrono::Duration::hours(-1));
        let (status, body) = refused_upgrade(addr, &format!("token={expired}&userId=X")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "AUTH_ERROR");
        assert_eq!(body["message"], "Token has expired");

        let stranger = fixture.token_for(Uuid::new_v4(), chrono::Duration::hours(1));
        let (status, body) = refused_upgrade(addr, &format!("token={stranger}&userId=X")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "NOT_FOUND");

        assert!(watcher.outbound.try_recv().is_err());
        assert_eq!(fixture.state.realtime.online_user_ids().await, vec!["A"]);
        assert_eq!(fixture.state.realtime.connection_count(), 1);
    }
}
