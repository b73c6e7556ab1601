// Serial ingest module.
// Invariants: the port is opened on run start and dropped on stop; raw lines
// are retained only in the bounded debug history.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::time::{self, Instant};
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tracing::{info, warn};

use rig_core::calib::Calibration;

use crate::acquisition::apply_line;
use crate::app::{RecordState, RigStore, SerialConfig};
use crate::constants::PORT_SETTLE_MS;
use crate::recording::record_raw_line;
use crate::utils::monotonic_ms;

/// Opens the configured port. The microcontroller resets when the port is
/// opened, so reading only starts after a short settle delay.
pub async fn open_port(config: &SerialConfig) -> tokio_serial::Result<SerialStream> {
    let stream = tokio_serial::new(&config.port, config.baud)
        .timeout(Duration::from_secs(1))
        .open_native_async()?;
    time::sleep(Duration::from_millis(PORT_SETTLE_MS)).await;
    info!(port = %config.port, baud = config.baud, "serial port opened");
    Ok(stream)
}

pub fn list_ports() -> Vec<String> {
    match tokio_serial::available_ports() {
        Ok(ports) => ports.into_iter().map(|port| port.port_name).collect(),
        Err(err) => {
            warn!(?err, "serial port enumeration failed");
            Vec::new()
        }
    }
}

/// Per-run acquisition loop: read line, parse, derive, append, record.
/// Returns when cancelled, on EOF, or on a read error (which is surfaced as
/// the store's `last_error`). Serial input is dropped while demo playback
/// owns the store.
pub async fn acquisition_loop(
    stream: SerialStream,
    store: Arc<RwLock<RigStore>>,
    calibration: Calibration,
    start: Instant,
    demo_active: Arc<AtomicBool>,
    record_state: Arc<Mutex<RecordState>>,
    mut cancel: oneshot::Receiver<()>,
) -> io::Result<()> {
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::with_capacity(128);

    loop {
        buf.clear();
        let read = tokio::select! {
            _ = &mut cancel => return Ok(()),
            read = reader.read_until(b'\n', &mut buf) => read,
        };
        match read {
            Ok(0) => {
                warn!("serial stream closed");
                let mut store = store.write().await;
                store.last_error = Some("serial stream closed".to_string());
                return Ok(());
            }
            Ok(_) => {}
            Err(err) => {
                warn!(?err, "serial read failed");
                let mut store = store.write().await;
                store.last_error = Some(format!("serial read failed: {err}"));
                return Err(err);
            }
        }

        if demo_active.load(Ordering::Relaxed) {
            continue;
        }

        // Boot noise from the microcontroller may not be valid UTF-8.
        let line = String::from_utf8_lossy(&buf);
        let now_ms = monotonic_ms(start);
        apply_line(&store, &calibration, &line, now_ms).await;
        record_raw_line(&record_state, now_ms, &line).await;
    }
}
