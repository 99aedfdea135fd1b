//! WebSocket endpoints.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use notionship_state::OutlineEvent;
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use tracing::{debug, warn};

use crate::state::AppState;

/// Document change and focus stream.
pub async fn document_stream(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_document_stream(socket, state))
}

async fn handle_document_stream(mut socket: WebSocket, state: AppState) {
    // Subscribe before taking the snapshot so no change falls in between.
    let mut events = BroadcastStream::new(state.events.subscribe());

    let snapshot = {
        let engine = state.engine.lock().await;
        OutlineEvent::changed(engine.revision(), engine.document())
    };

    if send_event(&mut socket, &snapshot).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.next() => {
                match event {
                    Some(Ok(event)) => {
                        if send_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                        warn!("Document subscriber lagged, skipped {} events", skipped);
                    }
                    None => break,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = socket.send(Message::Pong(data)).await;
                    }
                    _ => {}
                }
            }
        }
    }

    debug!("Document subscriber disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &OutlineEvent) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to encode event: {}", e);
            return Ok(());
        }
    };

    socket.send(Message::Text(json.into())).await
}
