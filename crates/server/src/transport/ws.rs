// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live callback feed — pushes received webhook callbacks to dashboard
//! clients over a single `/ws/callbacks` connection.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use crate::state::AppState;

/// `GET /ws/callbacks` — WebSocket upgrade for the live callback stream.
pub async fn ws_callbacks(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(state, socket))
}

/// Per-connection event loop.
async fn handle_connection(state: Arc<AppState>, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut rx = state.hub.subscribe();

    // Send recent callbacks so a freshly opened page is not blank.
    for event in state.hub.backfill().await {
        if let Ok(json) = serde_json::to_string(&event) {
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }
    }

    loop {
        tokio::select! {
            event = rx.recv() => {
                let event = match event {
                    Ok(e) => e,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    if ws_tx.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    // The feed is one-way; other client frames are ignored.
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
