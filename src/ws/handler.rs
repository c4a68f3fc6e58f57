
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

use crate::coordinator::Coordinator;
use crate::models::ClientEvent;
use crate::AppState;

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    info!("New WebSocket connection attempt");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state.coordinator.clone()))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, coordinator: Arc<Coordinator>) {
    // Opaque identity for this connection for the duration of the channel
    let connection_id = Uuid::new_v4();
    info!("WebSocket connection established with connection_id: {}", connection_id);

    // Split the socket into sender and receiver
    let (mut sender, mut receiver) = socket.split();

    // Outbound events queue up here; the coordinator never touches the socket
    let (tx, mut rx) = mpsc::unbounded_channel();
    coordinator.register(connection_id, tx).await;

    // Pump coordinator events out to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    error!("Failed to serialize event for {}: {}", connection_id, e);
                    continue;
                }
            };
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    // Read inbound frames and dispatch them, one at a time, in arrival order
    let recv_coordinator = coordinator.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(Message::Text(msg))) = receiver.next().await {
            // A malformed event is rejected on its own; connection state is untouched
            let event: ClientEvent = match serde_json::from_str(&msg) {
                Ok(event) => event,
                Err(e) => {
                    error!("Failed to parse event from {}: {}", connection_id, e);
                    continue;
                }
            };
            recv_coordinator.dispatch(connection_id, event).await;
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Single teardown path for every close cause: explicit close, network
    // failure, or process shutdown aborting the tasks.
    coordinator.unregister(connection_id).await;
    info!("WebSocket connection terminated: {}", connection_id);
}
