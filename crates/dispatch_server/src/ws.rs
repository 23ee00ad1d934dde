//! WebSocket transport for the subscriber channel.
//!
//! One connection task per subscriber: a forwarding half that drains the
//! [`Hub`]'s outbound channel onto the socket, and a receiving half that
//! decodes inbound `complete_assignment` / `algorithm_config` messages.
//! Either half failing (socket closed, send error) tears the whole
//! connection down and unregisters the subscriber.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::supervisor::Engine;
use crate::wire::InboundMessage;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(engine): State<Engine>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, engine))
}

async fn handle_socket(socket: WebSocket, engine: Engine) {
    let (id, mut outbound) = engine.hub.subscribe().await;
    let (mut sink, mut stream) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let recv_engine = engine.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => handle_inbound(&text, &recv_engine).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    engine.hub.unsubscribe(id).await;
}

async fn handle_inbound(text: &str, engine: &Engine) {
    let message: InboundMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            warn!(%err, "ignoring malformed subscriber message");
            return;
        }
    };

    match message {
        InboundMessage::CompleteAssignment { order_id } => {
            debug!(%order_id, "subscriber requested trip completion");
            engine.matcher.complete(&engine.store, order_id).await;
        }
        InboundMessage::AlgorithmConfig {
            proximity,
            supply_demand,
        } => {
            let mode = InboundMessage::into_mode(proximity, supply_demand);
            debug!(?mode, "subscriber updated matcher mode");
            engine.matcher.set_mode(mode).await;
        }
    }
}
