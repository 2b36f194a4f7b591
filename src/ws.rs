// src/ws.rs
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use metrics::gauge;
use tracing::info;

use crate::api::AppState;
use crate::poll::{self, SampleSink, SinkClosed};

/// `GET /globe`: upgrade and start the poll loop for this consumer.
pub async fn globe_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

async fn handle_session(socket: WebSocket, state: AppState) {
    info!("globe consumer connected");
    gauge!("feed_connections").increment(1.0);

    let mut sink = WsSink { socket };
    poll::run_poll_loop(&mut sink, state.fetcher.as_ref(), &state.config).await;

    gauge!("feed_connections").decrement(1.0);
    info!("globe consumer disconnected");
}

struct WsSink {
    socket: WebSocket,
}

#[async_trait]
impl SampleSink for WsSink {
    async fn deliver(&mut self, payload: String) -> Result<(), SinkClosed> {
        self.socket
            .send(Message::Text(payload.into()))
            .await
            .map_err(|_| SinkClosed)
    }

    async fn idle(&mut self, interval: Duration) -> bool {
        // Consumers never drive behavior: inbound frames are drained without
        // disturbing the cadence. Only a close (or transport error) matters.
        let deadline = tokio::time::Instant::now() + interval;
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => return true,
                msg = self.socket.recv() => match msg {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return false,
                    Some(Ok(_)) => {}
                },
            }
        }
    }
}
