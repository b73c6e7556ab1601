// Raw line recording helpers and status serialization.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::app::{RecordMode, RecordState};

#[derive(Serialize)]
pub struct RecordStatusResponse {
    pub mode: &'static str,
    pub active: bool,
    pub armed: bool,
    pub path: Option<String>,
    pub lines: u64,
}

pub fn record_status_snapshot(state: &RecordState) -> RecordStatusResponse {
    RecordStatusResponse {
        mode: state.mode.as_str(),
        active: state.mode == RecordMode::Recording,
        armed: state.mode == RecordMode::Armed,
        path: state
            .path
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
        lines: state.lines,
    }
}

/// One record per line: millisecond offset from recording start, a tab, then
/// the raw line with its terminator stripped.
pub fn format_record(offset_ms: u64, line: &str) -> String {
    format!("{offset_ms}\t{}\n", line.trim_end())
}

pub async fn stop_recording_internal(
    record_state: &Arc<Mutex<RecordState>>,
) -> RecordStatusResponse {
    let mut state = record_state.lock().await;
    if state.mode != RecordMode::Recording {
        return record_status_snapshot(&state);
    }
    if let Some(writer) = state.writer.as_mut() {
        let _ = writer.flush().await;
    }
    state.mode = RecordMode::Idle;
    state.writer = None;
    state.start_ms = None;
    record_status_snapshot(&state)
}

/// Promotes an armed recording to active when a run starts.
pub async fn maybe_start_recording(record_state: &Arc<Mutex<RecordState>>, now_ms: u64) {
    let path = {
        let state = record_state.lock().await;
        if state.mode != RecordMode::Armed {
            return;
        }
        state.path.clone()
    };
    let path = match path {
        Some(path) => path,
        None => {
            let mut state = record_state.lock().await;
            state.mode = RecordMode::Idle;
            return;
        }
    };

    let file = match tokio::fs::File::create(&path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(?err, path = %path.display(), "failed to create record file");
            let mut state = record_state.lock().await;
            state.mode = RecordMode::Idle;
            state.writer = None;
            state.start_ms = None;
            return;
        }
    };

    let mut state = record_state.lock().await;
    if state.mode != RecordMode::Armed {
        return;
    }
    state.writer = Some(tokio::io::BufWriter::new(file));
    state.start_ms = Some(now_ms);
    state.lines = 0;
    state.mode = RecordMode::Recording;
}

pub async fn record_raw_line(record_state: &Arc<Mutex<RecordState>>, now_ms: u64, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    let mut state = record_state.lock().await;
    if state.mode != RecordMode::Recording {
        return;
    }
    let start_ms = state.start_ms.get_or_insert(now_ms);
    let entry = format_record(now_ms.saturating_sub(*start_ms), line);
    if let Some(writer) = state.writer.as_mut() {
        if writer.write_all(entry.as_bytes()).await.is_err() {
            state.mode = RecordMode::Idle;
            state.writer = None;
            state.start_ms = None;
            return;
        }
        state.lines = state.lines.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_format_strips_terminator() {
        assert_eq!(format_record(150, "23.5;41.0;1000\r\n"), "150\t23.5;41.0;1000\n");
        assert_eq!(format_record(0, "a;b;c"), "0\ta;b;c\n");
    }

    #[tokio::test]
    async fn lines_are_dropped_unless_recording() {
        let state = Arc::new(Mutex::new(RecordState::default()));
        record_raw_line(&state, 10, "23.5;41.0;1\n").await;
        assert_eq!(state.lock().await.lines, 0);
    }
}
