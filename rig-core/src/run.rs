// Run lifecycle tracking and latest-state maintenance.

use serde::{Deserialize, Serialize};

use crate::model::{Derived, RawReading, RigState};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
}

#[derive(Clone, Copy, Debug)]
pub struct RunTransition {
    pub from: RunState,
    pub to: RunState,
}

/// Tracks one acquisition run: operator-driven start/stop, the latest state
/// snapshot, and per-run counters. Starting a run discards the previous one.
#[derive(Clone, Debug)]
pub struct RunTracker {
    pub state: RigState,
    pub run_state: RunState,
    pub run_index: u64,
    pub started_mono_ms: Option<u64>,
    pub started_epoch_ms: Option<u64>,
    pub sample_count: u64,
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            state: RigState::default(),
            run_state: RunState::Idle,
            run_index: 0,
            started_mono_ms: None,
            started_epoch_ms: None,
            sample_count: 0,
        }
    }

    /// Starts a new run: bumps the run index, resets the snapshot and
    /// counters, and records both clocks at t0.
    pub fn start(&mut self, now_mono_ms: u64, now_epoch_ms: u64) -> Option<RunTransition> {
        let from = self.run_state;
        self.run_state = RunState::Running;
        self.run_index = self.run_index.saturating_add(1);
        self.started_mono_ms = Some(now_mono_ms);
        self.started_epoch_ms = Some(now_epoch_ms);
        self.sample_count = 0;
        self.state = RigState::default();

        (from != RunState::Running).then_some(RunTransition {
            from,
            to: RunState::Running,
        })
    }

    /// Stops the run, freezing the snapshot and counters in place.
    pub fn stop(&mut self) -> Option<RunTransition> {
        let from = self.run_state;
        self.run_state = RunState::Idle;

        (from != RunState::Idle).then_some(RunTransition {
            from,
            to: RunState::Idle,
        })
    }

    /// Applies one reading while a run is active. Returns the elapsed seconds
    /// since t0, or `None` when idle (the reading is ignored).
    pub fn apply_reading(
        &mut self,
        reading: &RawReading,
        derived: &Derived,
        now_mono_ms: u64,
    ) -> Option<f64> {
        if self.run_state != RunState::Running {
            return None;
        }
        let started = self.started_mono_ms?;
        self.state.update_from(reading, derived);
        self.sample_count = self.sample_count.saturating_add(1);
        Some(now_mono_ms.saturating_sub(started) as f64 / 1000.0)
    }

    pub fn elapsed_s(&self, now_mono_ms: u64) -> Option<f64> {
        if self.run_state != RunState::Running {
            return None;
        }
        self.started_mono_ms
            .map(|started| now_mono_ms.saturating_sub(started) as f64 / 1000.0)
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calib::Calibration;
    use crate::line::parse_reading;

    fn reading_at(adc: i32) -> (RawReading, Derived) {
        let reading = RawReading {
            temperature_c: 22.0,
            humidity_pct: 45.0,
            adc,
        };
        (reading, Calibration::default().derive(adc))
    }

    #[test]
    fn start_bumps_index_and_resets() {
        let mut tracker = RunTracker::new();
        let (reading, derived) = reading_at(100);

        tracker.start(0, 1_000);
        tracker.apply_reading(&reading, &derived, 500);
        assert_eq!(tracker.sample_count, 1);

        let transition = tracker.start(2_000, 3_000);
        assert!(transition.is_none(), "restart while running is silent");
        assert_eq!(tracker.run_index, 2);
        assert_eq!(tracker.sample_count, 0);
        assert!(tracker.state.is_empty());
    }

    #[test]
    fn readings_are_ignored_while_idle() {
        let mut tracker = RunTracker::new();
        let (reading, derived) = reading_at(100);
        assert!(tracker.apply_reading(&reading, &derived, 500).is_none());
        assert_eq!(tracker.sample_count, 0);
    }

    #[test]
    fn elapsed_is_relative_to_t0() {
        let mut tracker = RunTracker::new();
        let (reading, derived) = reading_at(100);
        tracker.start(10_000, 0);
        let t = tracker.apply_reading(&reading, &derived, 10_150).unwrap();
        assert!((t - 0.15).abs() < 1e-9);
        assert_eq!(tracker.elapsed_s(11_000), Some(1.0));
    }

    #[test]
    fn stop_reports_transition_once() {
        let mut tracker = RunTracker::new();
        tracker.start(0, 0);
        let transition = tracker.stop().unwrap();
        assert_eq!(transition.from, RunState::Running);
        assert_eq!(transition.to, RunState::Idle);
        assert!(tracker.stop().is_none());
    }

    #[test]
    fn parsed_line_flows_into_state() {
        let mut tracker = RunTracker::new();
        tracker.start(0, 0);
        let reading = parse_reading("23.5;41.0;1000").unwrap();
        let derived = Calibration::default().derive(reading.adc);
        tracker.apply_reading(&reading, &derived, 100);
        assert_eq!(tracker.state.force_n, Some(500.0));
        assert_eq!(tracker.state.temperature_c, Some(23.5));
    }
}
