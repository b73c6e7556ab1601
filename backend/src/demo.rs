// Demo playback utilities and data path resolution.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{oneshot, RwLock};
use tokio::time::{self, Instant};

use rig_core::calib::Calibration;

use crate::acquisition::apply_line;
use crate::app::RigStore;
use crate::constants::{DEMO_DIR, DEMO_FILE};
use crate::utils::{monotonic_ms, now_epoch_ms};

pub fn demo_default_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DEMO_DIR).join(DEMO_FILE)
}

pub fn resolve_demo_path(data_dir: &Path) -> PathBuf {
    let primary = demo_default_path(data_dir);
    if primary.is_file() {
        return primary;
    }
    let fallback = PathBuf::from("../data").join(DEMO_DIR).join(DEMO_FILE);
    if fallback.is_file() {
        return fallback;
    }
    primary
}

pub fn resolve_data_dir() -> PathBuf {
    if let Ok(value) = env::var("TENSILEBENCH_DATA_DIR") {
        return PathBuf::from(value);
    }
    let local = PathBuf::from("./data");
    if local.is_dir() {
        return local;
    }
    let parent = PathBuf::from("../data");
    if parent.is_dir() {
        return parent;
    }
    local
}

/// Parses one `offset_ms<TAB>raw_line` record of a line log.
pub fn parse_record(entry: &str) -> Option<(u64, &str)> {
    let (offset, line) = entry.trim_end().split_once('\t')?;
    let offset_ms = offset.trim().parse::<u64>().ok()?;
    Some((offset_ms, line))
}

/// Demo playback presents as a fresh run over the live store.
pub async fn reset_store_for_demo(store: &Arc<RwLock<RigStore>>, now_ms: u64) {
    let mut store = store.write().await;
    store.reset_for_run();
    store.raw_lines.clear();
    store.tracker.start(now_ms, now_epoch_ms());
}

/// Replays a recorded line log through the normal apply path at its original
/// pacing, looping until cancelled.
pub async fn demo_playback_loop(
    path: PathBuf,
    store: Arc<RwLock<RigStore>>,
    calibration: Calibration,
    start: Instant,
    mut cancel: oneshot::Receiver<()>,
) -> std::io::Result<()> {
    let mut first_pass = true;

    loop {
        if first_pass {
            first_pass = false;
        } else {
            // Hold the finished pass on screen before looping.
            tokio::select! {
                _ = &mut cancel => break,
                _ = time::sleep(std::time::Duration::from_millis(1000)) => {}
            }
        }
        reset_store_for_demo(&store, monotonic_ms(start)).await;

        let file = tokio::fs::File::open(&path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut last_offset = 0u64;

        loop {
            let entry = tokio::select! {
                _ = &mut cancel => {
                    finish_demo(&store).await;
                    return Ok(());
                }
                entry = lines.next_line() => entry?,
            };
            let Some(entry) = entry else { break };
            let Some((offset_ms, line)) = parse_record(&entry) else {
                continue;
            };

            let delay_ms = offset_ms.saturating_sub(last_offset);
            if delay_ms > 0 {
                tokio::select! {
                    _ = &mut cancel => {
                        finish_demo(&store).await;
                        return Ok(());
                    }
                    _ = time::sleep(std::time::Duration::from_millis(delay_ms)) => {}
                }
            }

            let raw = format!("{line}\n");
            apply_line(&store, &calibration, &raw, monotonic_ms(start)).await;
            last_offset = offset_ms;
        }
    }

    finish_demo(&store).await;
    Ok(())
}

async fn finish_demo(store: &Arc<RwLock<RigStore>>) {
    let mut store = store.write().await;
    store.tracker.stop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::format_record;

    #[test]
    fn record_round_trips() {
        let entry = format_record(1234, "23.5;41.0;1000\r\n");
        let (offset_ms, line) = parse_record(&entry).unwrap();
        assert_eq!(offset_ms, 1234);
        assert_eq!(line, "23.5;41.0;1000");
    }

    #[test]
    fn malformed_records_are_skipped() {
        assert!(parse_record("no tab here").is_none());
        assert!(parse_record("abc\t1;2;3").is_none());
        assert!(parse_record("").is_none());
    }

    #[tokio::test]
    async fn playback_replays_into_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo_run.log");
        let mut log = String::new();
        for (offset, adc) in [(0u64, 100), (1, 200), (2, 300)] {
            log.push_str(&format_record(offset, &format!("22.0;40.0;{adc}")));
        }
        tokio::fs::write(&path, log).await.unwrap();

        let store = Arc::new(RwLock::new(RigStore::new()));
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let playback = demo_playback_loop(
            path,
            store.clone(),
            Calibration::default(),
            Instant::now(),
            cancel_rx,
        );
        // First pass finishes well before the loop delay; cancel afterwards.
        let guard = tokio::spawn(async move {
            time::sleep(std::time::Duration::from_millis(300)).await;
            let _ = cancel_tx.send(());
        });
        playback.await.unwrap();
        guard.await.unwrap();

        let store = store.read().await;
        assert_eq!(store.samples.len(), 3);
        assert_eq!(store.samples[2].force_n, 150.0);
    }
}
