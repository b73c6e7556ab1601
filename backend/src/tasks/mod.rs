// Background tasks for websocket state and sample fanout.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::time::{self, Instant};

use rig_core::run::RunState;

use crate::app::RigStore;
use crate::constants::{SAMPLES_INTERVAL_MS, SCHEMA_VERSION, STATE_INTERVAL_MS};
use crate::utils::{monotonic_ms, next_sequence, now_epoch_ms};
use crate::ws::{SamplesMessage, StateUpdateMessage};

/// Broadcasts the latest rig state at the dashboard redraw cadence.
pub async fn state_update_task(
    store: Arc<RwLock<RigStore>>,
    tx: broadcast::Sender<String>,
    sequence: Arc<AtomicU64>,
    start: Instant,
) {
    let mut interval = time::interval(Duration::from_millis(STATE_INTERVAL_MS));
    loop {
        interval.tick().await;
        let now_ms = monotonic_ms(start);
        let message = {
            let store = store.read().await;
            if store.tracker.state.is_empty()
                && store.tracker.run_state == RunState::Idle
                && store.last_error.is_none()
            {
                continue;
            }
            StateUpdateMessage {
                schema_version: SCHEMA_VERSION,
                timestamp_ms: now_epoch_ms(),
                monotonic_ms: now_ms,
                sequence: next_sequence(sequence.as_ref()),
                message_type: "state_update",
                run_state: store.tracker.run_state,
                run_index: store.tracker.run_index,
                sample_count: store.tracker.sample_count,
                elapsed_s: store.tracker.elapsed_s(now_ms),
                last_error: store.last_error.clone(),
                state: store.tracker.state.clone(),
            }
        };

        if let Ok(payload) = serde_json::to_string(&message) {
            let _ = tx.send(payload);
        }
    }
}

/// Broadcasts samples appended since the previous tick. A changed run index
/// resets the cursor so clients rebuild from the next snapshot.
pub async fn samples_task(
    store: Arc<RwLock<RigStore>>,
    tx: broadcast::Sender<String>,
    sequence: Arc<AtomicU64>,
    start: Instant,
) {
    let mut interval = time::interval(Duration::from_millis(SAMPLES_INTERVAL_MS));
    let mut last_run_index = 0u64;
    let mut cursor = 0usize;

    loop {
        interval.tick().await;
        let message = {
            let store = store.read().await;
            if store.tracker.run_index != last_run_index {
                last_run_index = store.tracker.run_index;
                cursor = 0;
            }
            if store.samples.len() <= cursor {
                continue;
            }
            let appended = store.samples[cursor..].to_vec();
            cursor = store.samples.len();
            SamplesMessage {
                schema_version: SCHEMA_VERSION,
                timestamp_ms: now_epoch_ms(),
                monotonic_ms: monotonic_ms(start),
                sequence: next_sequence(sequence.as_ref()),
                message_type: "samples_append",
                run_index: store.tracker.run_index,
                samples: appended,
            }
        };

        if let Ok(payload) = serde_json::to_string(&message) {
            let _ = tx.send(payload);
        }
    }
}
