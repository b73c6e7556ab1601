// WebSocket transport layer for live dashboard streaming.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State as AxumState;
use axum::response::IntoResponse;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use rig_core::model::RigState;
use rig_core::run::RunState;

use crate::app::AppState;
use crate::constants::SCHEMA_VERSION;
use crate::model::Sample;
use crate::utils::{monotonic_ms, next_sequence, now_epoch_ms};

#[derive(Serialize)]
pub struct HandshakeHello {
    pub schema_version: &'static str,
    pub timestamp_ms: u64,
    pub monotonic_ms: u64,
    pub sequence: u64,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub server_version: &'static str,
    pub capabilities: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct StateUpdateMessage {
    pub schema_version: &'static str,
    pub timestamp_ms: u64,
    pub monotonic_ms: u64,
    pub sequence: u64,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub run_state: RunState,
    pub run_index: u64,
    pub sample_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub state: RigState,
}

/// Samples appended to the run since the previous message. A snapshot
/// carries the whole run so a client can rebuild its charts on connect.
#[derive(Serialize)]
pub struct SamplesMessage {
    pub schema_version: &'static str,
    pub timestamp_ms: u64,
    pub monotonic_ms: u64,
    pub sequence: u64,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub run_index: u64,
    pub samples: Vec<Sample>,
}

pub async fn ws_handler(
    AxumState(app_state): AxumState<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(mut socket: WebSocket, app_state: AppState) {
    info!("ws connected");
    let mut rx = app_state.tx.subscribe();
    let hello = HandshakeHello {
        schema_version: SCHEMA_VERSION,
        timestamp_ms: now_epoch_ms(),
        monotonic_ms: monotonic_ms(app_state.start_instant),
        sequence: next_sequence(app_state.sequence.as_ref()),
        message_type: "handshake_hello",
        server_version: env!("CARGO_PKG_VERSION"),
        capabilities: vec!["state_update", "samples_append", "run_snapshot"],
    };

    if let Ok(payload) = serde_json::to_string(&hello) {
        if socket.send(Message::Text(payload)).await.is_err() {
            return;
        }
    }

    // Full-run snapshot so the client starts with complete charts.
    let snapshot = {
        let store = app_state.store.read().await;
        SamplesMessage {
            schema_version: SCHEMA_VERSION,
            timestamp_ms: now_epoch_ms(),
            monotonic_ms: monotonic_ms(app_state.start_instant),
            sequence: next_sequence(app_state.sequence.as_ref()),
            message_type: "run_snapshot",
            run_index: store.tracker.run_index,
            samples: store.samples.clone(),
        }
    };
    if let Ok(payload) = serde_json::to_string(&snapshot) {
        if socket.send(Message::Text(payload)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Ok(payload) => {
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        continue;
                    }
                    Err(_) => break,
                }
            }
            inbound = socket.next() => {
                match inbound {
                    Some(Ok(Message::Ping(payload))) => {
                        if socket.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(?err, "ws error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }
    info!("ws disconnected");
}
