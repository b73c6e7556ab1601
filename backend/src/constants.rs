// Shared constants for server timing, protocol, and paths.

pub const SCHEMA_VERSION: &str = "1.0";
pub const STATE_INTERVAL_MS: u64 = 150;
pub const SAMPLES_INTERVAL_MS: u64 = 250;
pub const RAW_LINE_HISTORY: usize = 5;
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 115_200;
pub const PORT_SETTLE_MS: u64 = 300;
pub const DEMO_DIR: &str = "demo";
pub const DEMO_FILE: &str = "demo_run.log";
pub const SPECIMEN_FILE: &str = "specimen.json";
pub const EXPORT_FILE_NAME: &str = "tensile_run.csv";
