// One parsed sensor reading and the mechanical values derived from it.

use serde::Serialize;

/// Raw fields of a single serial line: ambient sensors plus the load-cell
/// ADC count.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RawReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub adc: i32,
}

/// Values derived from the ADC count via the calibration constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Derived {
    pub force_n: f32,
    pub strain: f32,
    pub stress_n_mm2: f32,
}
