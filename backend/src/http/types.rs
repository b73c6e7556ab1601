// HTTP response payload types.

use serde::Serialize;

use rig_core::run::RunState;

use crate::model::Sample;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct RunStatusResponse {
    pub state: RunState,
    pub run_index: u64,
    pub sample_count: u64,
    pub lines_total: u64,
    pub lines_dropped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

#[derive(Serialize)]
pub struct PortsResponse {
    pub ports: Vec<String>,
}

#[derive(Serialize)]
pub struct SamplesResponse {
    pub run_index: u64,
    pub count: usize,
    pub samples: Vec<Sample>,
}

#[derive(Serialize)]
pub struct DemoStatusResponse {
    pub active: bool,
    pub path: Option<String>,
}

#[derive(Serialize)]
pub struct DebugRawLine {
    pub captured_at_ms: u64,
    pub line: String,
    pub accepted: bool,
}

#[derive(Serialize)]
pub struct DebugAcquisitionResponse {
    pub timestamp_ms: u64,
    pub run_state: RunState,
    pub run_index: u64,
    pub lines_total: u64,
    pub lines_dropped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_line_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub raw_lines: Vec<DebugRawLine>,
}
