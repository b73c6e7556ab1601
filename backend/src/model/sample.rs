// One row of the accumulated run table.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Sample {
    /// Seconds since run start.
    pub t_s: f64,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub adc: i32,
    pub force_n: f32,
    pub strain: f32,
    pub stress_n_mm2: f32,
}
