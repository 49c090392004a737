use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use tableside_order_service::events::OrderEvent;
use tableside_order_service::hub::EventHub;
use tableside_order_service::session::{CloseWatch, EventSink, SessionError};

use crate::error::ApiError;

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/ws/orders", get(order_events))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Browsers cannot set headers on a WebSocket handshake, so the token
    /// rides in the query string.
    pub token: String,
}

/// Live order feed. The entitlement set is computed once here, at
/// connection time; restaurants acquired later need a reconnect to show up.
#[instrument(skip_all)]
pub async fn order_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let username = state
        .auth
        .resolve(&query.token)
        .ok_or(ApiError::InvalidToken)?;
    let entitled = state.store.restaurant_ids_owned_by(&username);
    tracing::debug!(user = %username, restaurants = entitled.len(), "order feed connected");

    let hub = Arc::clone(&state.hub);
    Ok(ws.on_upgrade(move |socket| serve_session(socket, hub, entitled)))
}

async fn serve_session(socket: WebSocket, hub: Arc<EventHub>, entitled: HashSet<Uuid>) {
    let session = hub.subscribe(entitled);
    let (sink, stream) = socket.split();
    session
        .run(WsEventSink { sink }, WsCloseWatch { stream })
        .await;
}

struct WsEventSink {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl EventSink for WsEventSink {
    async fn send(&mut self, event: &OrderEvent) -> Result<(), SessionError> {
        let payload =
            serde_json::to_string(event).map_err(|err| SessionError::Write(err.to_string()))?;
        self.sink
            .send(Message::Text(payload.into()))
            .await
            .map_err(|err| SessionError::Write(err.to_string()))
    }
}

struct WsCloseWatch {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl CloseWatch for WsCloseWatch {
    async fn closed(&mut self) {
        // Inbound frames carry no application protocol; reading serves only
        // to notice the peer going away.
        while let Some(Ok(message)) = self.stream.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    }
}
