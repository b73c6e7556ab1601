// Serial line parser for the rig's ad hoc wire format.
// Invariants: lines that do not parse are dropped, never guessed at.

use crate::model::RawReading;

/// Parses one `temperature;humidity;adc` line.
///
/// Lenient on purpose: surrounding whitespace is trimmed, a missing or empty
/// third field defaults to 0, and extra trailing fields are ignored (the
/// firmware appends its own deformation estimate and a trailing `;`). Lines
/// with fewer than two delimiters or unparseable numbers yield `None`.
pub fn parse_reading(line: &str) -> Option<RawReading> {
    let line = line.trim();
    if line.matches(';').count() < 2 {
        return None;
    }

    let mut parts = line.split(';');
    let temperature_c = parse_f32(parts.next())?;
    let humidity_pct = parse_f32(parts.next())?;
    let adc = match parts.next().map(str::trim) {
        None | Some("") => 0,
        Some(value) => value.parse::<i32>().ok()?,
    };

    Some(RawReading {
        temperature_c,
        humidity_pct,
        adc,
    })
}

fn parse_f32(value: Option<&str>) -> Option<f32> {
    value.and_then(|value| value.trim().parse::<f32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_line() {
        let reading = parse_reading("23.5;41.0;1024").unwrap();
        assert_eq!(reading.temperature_c, 23.5);
        assert_eq!(reading.humidity_pct, 41.0);
        assert_eq!(reading.adc, 1024);
    }

    #[test]
    fn parses_firmware_line_with_trailing_fields() {
        // The ESP32 emits `temp;hum;adc;deformation;` with CRLF.
        let reading = parse_reading("21.20;48.90;2048;2.048;\r\n").unwrap();
        assert_eq!(reading.adc, 2048);
    }

    #[test]
    fn empty_third_field_defaults_to_zero() {
        let reading = parse_reading("23.5;41.0;").unwrap();
        assert_eq!(reading.adc, 0);
    }

    #[test]
    fn too_few_delimiters_is_dropped() {
        assert!(parse_reading("23.5;41.0").is_none());
        assert!(parse_reading("23.5").is_none());
        assert!(parse_reading("").is_none());
    }

    #[test]
    fn garbage_fields_are_dropped() {
        assert!(parse_reading("Erreur DHT22;;").is_none());
        assert!(parse_reading("23.5;humid;0").is_none());
        assert!(parse_reading("23.5;41.0;12.7").is_none());
    }

    #[test]
    fn negative_adc_is_accepted() {
        // Load cell can read below its zero offset.
        let reading = parse_reading("23.5;41.0;-12").unwrap();
        assert_eq!(reading.adc, -12);
    }
}
