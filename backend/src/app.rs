// Application state and shared data structures for the server.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::BufWriter;
use tokio::sync::{broadcast, oneshot, watch, Mutex, RwLock};
use tokio::time::Instant;

use rig_core::calib::Calibration;
use rig_core::run::RunTracker;

use crate::buffers::RingBuffer;
use crate::constants::{DEFAULT_BAUD, DEFAULT_SERIAL_PORT, RAW_LINE_HISTORY};
use crate::meta::SpecimenStore;
use crate::model::Sample;

#[derive(Clone)]
pub struct AppState {
    pub tx: broadcast::Sender<String>,
    pub sequence: Arc<AtomicU64>,
    pub start_instant: Instant,
    pub serial_config_tx: watch::Sender<SerialConfig>,
    pub store: Arc<RwLock<RigStore>>,
    pub calibration: Calibration,
    pub specimen: Arc<SpecimenStore>,
    pub run_handle: Arc<Mutex<RunHandle>>,
    pub demo_active: Arc<AtomicBool>,
    pub demo_state: Arc<Mutex<DemoState>>,
    pub record_state: Arc<Mutex<RecordState>>,
    pub data_dir: PathBuf,
}

pub struct RigStore {
    pub tracker: RunTracker,
    pub samples: Vec<Sample>,
    pub raw_lines: RingBuffer<RawLineSnapshot>,
    pub lines_total: u64,
    pub lines_dropped: u64,
    pub last_line_ms: Option<u64>,
    pub last_error: Option<String>,
}

impl RigStore {
    pub fn new() -> Self {
        Self {
            tracker: RunTracker::new(),
            samples: Vec::new(),
            raw_lines: RingBuffer::new(RAW_LINE_HISTORY),
            lines_total: 0,
            lines_dropped: 0,
            last_line_ms: None,
            last_error: None,
        }
    }

    /// Discards the previous run's data. The raw line history survives for
    /// debugging across runs.
    pub fn reset_for_run(&mut self) {
        self.samples.clear();
        self.lines_total = 0;
        self.lines_dropped = 0;
        self.last_line_ms = None;
        self.last_error = None;
    }
}

impl Default for RigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct RawLineSnapshot {
    pub captured_at_ms: u64,
    pub line: String,
    pub accepted: bool,
}

/// Handle to the spawned acquisition task for the current run. `run_index`
/// lets a finishing task tell whether it still owns the handle.
#[derive(Default)]
pub struct RunHandle {
    pub active: bool,
    pub run_index: u64,
    pub cancel: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
pub struct DemoState {
    pub active: bool,
    pub path: Option<PathBuf>,
    pub cancel: Option<oneshot::Sender<()>>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordMode {
    Idle,
    Armed,
    Recording,
}

impl RecordMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordMode::Idle => "idle",
            RecordMode::Armed => "armed",
            RecordMode::Recording => "recording",
        }
    }
}

pub struct RecordState {
    pub mode: RecordMode,
    pub path: Option<PathBuf>,
    pub writer: Option<BufWriter<tokio::fs::File>>,
    pub start_ms: Option<u64>,
    pub lines: u64,
}

impl Default for RecordState {
    fn default() -> Self {
        Self {
            mode: RecordMode::Idle,
            path: None,
            writer: None,
            start_ms: None,
            lines: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERIAL_PORT.to_string(),
            baud: DEFAULT_BAUD,
        }
    }
}
