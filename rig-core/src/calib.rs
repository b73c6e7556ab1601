// Calibration constants and unit derivation for the load channel.

use crate::model::Derived;

/// Specimen cross-section in mm².
pub const SURFACE_MM2: f32 = 41.6;
/// Newtons per ADC count.
pub const ADC_TO_FORCE: f32 = 0.5;
/// Strain (unitless) per ADC count.
pub const ADC_TO_STRAIN: f32 = 1e-5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    pub surface_mm2: f32,
    pub adc_to_force: f32,
    pub adc_to_strain: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            surface_mm2: SURFACE_MM2,
            adc_to_force: ADC_TO_FORCE,
            adc_to_strain: ADC_TO_STRAIN,
        }
    }
}

impl Calibration {
    /// Derives force, strain, and stress from a raw ADC count.
    /// Stress falls back to 0 when the configured cross-section is not
    /// positive.
    pub fn derive(&self, adc: i32) -> Derived {
        let force_n = adc as f32 * self.adc_to_force;
        let strain = adc as f32 * self.adc_to_strain;
        let stress_n_mm2 = if self.surface_mm2 > 0.0 {
            force_n / self.surface_mm2
        } else {
            0.0
        };

        Derived {
            force_n,
            strain,
            stress_n_mm2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_is_adc_times_constant() {
        let derived = Calibration::default().derive(1000);
        assert_eq!(derived.force_n, 500.0);
        assert_eq!(derived.strain, 0.01);
    }

    #[test]
    fn stress_is_force_over_surface() {
        let derived = Calibration::default().derive(1000);
        assert!((derived.stress_n_mm2 - 500.0 / 41.6).abs() < 1e-6);
    }

    #[test]
    fn zero_surface_yields_zero_stress() {
        let calib = Calibration {
            surface_mm2: 0.0,
            ..Calibration::default()
        };
        assert_eq!(calib.derive(1000).stress_n_mm2, 0.0);
    }

    #[test]
    fn zero_adc_derives_zeroes() {
        let derived = Calibration::default().derive(0);
        assert_eq!(derived.force_n, 0.0);
        assert_eq!(derived.strain, 0.0);
        assert_eq!(derived.stress_n_mm2, 0.0);
    }
}
