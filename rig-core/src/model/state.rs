// Rig state snapshot used by the UI and streaming layer.

use serde::Serialize;

use super::{Derived, RawReading};

#[derive(Clone, Debug, Default, Serialize)]
pub struct RigState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_pct: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adc: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_n: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strain: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_n_mm2: Option<f32>,
}

impl RigState {
    pub fn update_from(&mut self, reading: &RawReading, derived: &Derived) {
        self.temperature_c = Some(reading.temperature_c);
        self.humidity_pct = Some(reading.humidity_pct);
        self.adc = Some(reading.adc);
        self.force_n = Some(derived.force_n);
        self.strain = Some(derived.strain);
        self.stress_n_mm2 = Some(derived.stress_n_mm2);
    }

    pub fn is_empty(&self) -> bool {
        self.adc.is_none() && self.temperature_c.is_none() && self.humidity_pct.is_none()
    }
}
