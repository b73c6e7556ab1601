// CSV export of the accumulated sample table.

use crate::model::Sample;

const HEADER: [&str; 7] = [
    "time_s",
    "temperature_c",
    "humidity_pct",
    "adc",
    "force_n",
    "strain",
    "stress_n_mm2",
];

/// Renders the sample table as CSV: a header row, then one row per sample in
/// insertion order.
pub fn to_csv(samples: &[Sample]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for sample in samples {
        writer.write_record(&[
            sample.t_s.to_string(),
            sample.temperature_c.to_string(),
            sample.humidity_pct.to_string(),
            sample.adc.to_string(),
            sample.force_n.to_string(),
            sample.strain.to_string(),
            sample.stress_n_mm2.to_string(),
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    let bytes = writer.into_inner().unwrap_or_default();
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_is_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "time_s,temperature_c,humidity_pct,adc,force_n,strain,stress_n_mm2\n"
        );
    }

    #[test]
    fn rows_follow_in_insertion_order() {
        let samples = vec![
            Sample {
                t_s: 0.15,
                temperature_c: 23.5,
                humidity_pct: 41.0,
                adc: 1000,
                force_n: 500.0,
                strain: 0.01,
                stress_n_mm2: 12.5,
            },
            Sample {
                t_s: 0.3,
                temperature_c: 23.5,
                humidity_pct: 41.0,
                adc: 0,
                force_n: 0.0,
                strain: 0.0,
                stress_n_mm2: 0.0,
            },
        ];
        let csv = to_csv(&samples).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("time_s,temperature_c,humidity_pct,adc,force_n,strain,stress_n_mm2")
        );
        assert_eq!(lines.next(), Some("0.15,23.5,41,1000,500,0.01,12.5"));
        assert_eq!(lines.next(), Some("0.3,23.5,41,0,0,0,0"));
        assert_eq!(lines.next(), None);
    }
}
