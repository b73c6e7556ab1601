// Line application logic shared by serial ingest and demo playback.

use std::sync::Arc;

use tokio::sync::RwLock;

use rig_core::calib::Calibration;
use rig_core::line::parse_reading;

use crate::app::{RawLineSnapshot, RigStore};
use crate::model::Sample;
use crate::utils::now_epoch_ms;

/// Parses one raw serial line and folds it into the run store. Malformed
/// lines are counted and kept in the bounded debug history, nothing more.
/// Readings that arrive while no run is active update nothing.
pub async fn apply_line(
    store: &Arc<RwLock<RigStore>>,
    calibration: &Calibration,
    raw: &str,
    now_ms: u64,
) {
    let reading = parse_reading(raw);

    let mut store = store.write().await;
    store.lines_total = store.lines_total.saturating_add(1);
    store.last_line_ms = Some(now_ms);
    store.raw_lines.push(RawLineSnapshot {
        captured_at_ms: now_epoch_ms(),
        line: raw.trim_end().to_string(),
        accepted: reading.is_some(),
    });

    let Some(reading) = reading else {
        store.lines_dropped = store.lines_dropped.saturating_add(1);
        return;
    };

    let derived = calibration.derive(reading.adc);
    if let Some(t_s) = store.tracker.apply_reading(&reading, &derived, now_ms) {
        store.samples.push(Sample {
            t_s,
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_pct,
            adc: reading.adc,
            force_n: derived.force_n,
            strain: derived.strain,
            stress_n_mm2: derived.stress_n_mm2,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_store() -> Arc<RwLock<RigStore>> {
        let mut store = RigStore::new();
        store.tracker.start(0, 0);
        Arc::new(RwLock::new(store))
    }

    #[tokio::test]
    async fn valid_line_appends_sample() {
        let store = running_store();
        let calib = Calibration::default();

        apply_line(&store, &calib, "23.5;41.0;1000\r\n", 150).await;

        let store = store.read().await;
        assert_eq!(store.samples.len(), 1);
        let sample = &store.samples[0];
        assert!((sample.t_s - 0.15).abs() < 1e-9);
        assert_eq!(sample.force_n, 500.0);
        assert_eq!(store.lines_total, 1);
        assert_eq!(store.lines_dropped, 0);
    }

    #[tokio::test]
    async fn malformed_line_only_counts() {
        let store = running_store();
        let calib = Calibration::default();

        apply_line(&store, &calib, "bogus\n", 150).await;

        let store = store.read().await;
        assert!(store.samples.is_empty());
        assert_eq!(store.lines_dropped, 1);
        let raw = store.raw_lines.latest().unwrap();
        assert!(!raw.accepted);
        assert_eq!(raw.line, "bogus");
    }

    #[tokio::test]
    async fn samples_keep_time_order() {
        let store = running_store();
        let calib = Calibration::default();

        for (now_ms, adc) in [(100u64, 10), (250, 20), (400, 30)] {
            let line = format!("20.0;40.0;{adc}");
            apply_line(&store, &calib, &line, now_ms).await;
        }

        let store = store.read().await;
        let times: Vec<f64> = store.samples.iter().map(|sample| sample.t_s).collect();
        assert_eq!(times, vec![0.1, 0.25, 0.4]);
    }

    #[tokio::test]
    async fn idle_store_ignores_reading_but_counts_line() {
        let store = Arc::new(RwLock::new(RigStore::new()));
        let calib = Calibration::default();

        apply_line(&store, &calib, "23.5;41.0;1000", 150).await;

        let store = store.read().await;
        assert!(store.samples.is_empty());
        assert_eq!(store.lines_total, 1);
        assert_eq!(store.lines_dropped, 0);
    }
}
