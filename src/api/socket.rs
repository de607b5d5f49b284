//! Push channel: pairing events streamed to browsers over a WebSocket.

use super::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wadash_core::event::PushEvent;

/// `GET /socket`
pub(super) async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_events(socket, state))
}

async fn stream_events(socket: WebSocket, state: AppState) {
    let id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();

    // Subscribe before taking the snapshot so nothing falls in between.
    let mut events = state.tracker.subscribe();
    info!(
        "browser {id} connected ({} watching)",
        state.tracker.subscriber_count()
    );

    if let Some(current) = state.tracker.snapshot().await {
        if send(&mut sink, &current).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if send(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("browser {id} lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    debug!("message from browser {id}: {}", text.as_str());
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    info!("browser {id} disconnected");
}

async fn send<S>(sink: &mut S, event: &PushEvent) -> Result<(), ()>
where
    S: Sink<Message> + Unpin,
{
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!("failed to encode '{}' event: {e}", event.name());
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
