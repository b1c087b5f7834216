//! WebSocket Occupancy Stream
//!
//! Pushes every live occupancy snapshot to connected dashboards as a JSON
//! text frame.
//!
//! ## Protocol
//!
//! 1. Client connects with a bearer token (header or `access_token` query)
//! 2. Connection upgraded to WebSocket
//! 3. Server sends the current snapshot, if one exists
//! 4. Server sends each newer snapshot as it is published
//!
//! A client that falls behind only ever receives the latest snapshot; older
//! unread ones are skipped.

use crate::jobs::LiveOccupancy;
use crate::middleware::AuthExtractor;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use rackyard_core::OccupancySnapshot;
use tracing::{debug, error, info, warn};

/// WebSocket upgrade handler.
///
/// ```text
/// GET /api/v1/ws/occupancy?access_token=<token>
/// Upgrade: websocket
/// ```
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(live): State<LiveOccupancy>,
    AuthExtractor(auth): AuthExtractor,
) -> Response {
    info!(username = %auth.username, "WebSocket connection request");
    let username = auth.username;
    ws.on_upgrade(move |socket| handle_socket(socket, live, username))
}

/// Handle an individual WebSocket connection for its lifetime.
async fn handle_socket(socket: WebSocket, live: LiveOccupancy, username: String) {
    info!(username = %username, "WebSocket connected");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = live.subscribe();

    let current = rx.borrow_and_update().clone();
    if let Some(snapshot) = current {
        if let Err(e) = send_snapshot(&mut sender, &snapshot).await {
            error!(username = %username, error = %e, "Failed to send initial snapshot");
            return;
        }
    }

    let client = username.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    debug!(username = %client, "Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Text(_)) | Ok(Message::Binary(_)) => {
                    debug!(username = %client, "Received client message (ignored)");
                }
                Err(e) => {
                    warn!(username = %client, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    info!(username = %username, "Live occupancy channel closed");
                    break;
                }
                let latest = rx.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    if let Err(e) = send_snapshot(&mut sender, &snapshot).await {
                        error!(
                            username = %username,
                            error = %e,
                            "Failed to send snapshot, closing connection"
                        );
                        break;
                    }
                }
            }

            _ = &mut recv_task => {
                debug!(username = %username, "Receiver task finished");
                break;
            }
        }
    }

    recv_task.abort();
    info!(username = %username, "WebSocket disconnected");
}

/// Serialize a snapshot and send it as a text message.
async fn send_snapshot(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    snapshot: &OccupancySnapshot,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(snapshot).map_err(|e| {
        error!(error = %e, "Failed to serialize snapshot");
        axum::Error::new(e)
    })?;

    sender.send(Message::Text(json.into())).await
}

/// WebSocket routes, nested under `/ws`.
pub fn create_router(live: LiveOccupancy) -> Router {
    Router::new()
        .route("/occupancy", get(ws_handler))
        .with_state(live)
}
