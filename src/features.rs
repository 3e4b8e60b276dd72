//! Builds the model's input vector from a station's pollutant readings.

use ndarray::Array2;
use serde::Serialize;

use crate::pollutant::{Pollutant, PollutantReadings};

/// Value used for a pollutant the station did not report.
const MISSING_AVG: &str = "0";

/// Model input: one average per canonical pollutant, in [`Pollutant::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; Pollutant::COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; Pollutant::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, pollutant: Pollutant) -> f64 {
        self.0[pollutant.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// The vector as a single-row matrix, the shape the fitted transforms take.
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, Pollutant::COUNT), |(_, j)| self.0[j])
    }
}

/// Parses one reported average.
///
/// Absent values count as `"0"`. Anything that is not a float after trimming
/// yields 0.0; a bad field never fails the vector.
pub fn parse_pollutant(raw: Option<&str>) -> f64 {
    raw.unwrap_or(MISSING_AVG)
        .trim()
        .parse::<f64>()
        .unwrap_or(0.0)
}

/// Maps readings to a [`FeatureVector`] using each pollutant's `avg`.
pub fn build_features(readings: &PollutantReadings) -> FeatureVector {
    let mut values = [0.0; Pollutant::COUNT];
    for pollutant in Pollutant::ALL {
        let avg = readings
            .get(pollutant)
            .map(|r| r.avg.as_deref().unwrap_or(MISSING_AVG));
        values[pollutant.index()] = parse_pollutant(avg);
    }
    FeatureVector(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pollutant::PollutantReading;

    #[test]
    fn test_parse_pollutant_numbers() {
        assert_eq!(parse_pollutant(Some("55.2")), 55.2);
        assert_eq!(parse_pollutant(Some(" 17 ")), 17.0);
        assert_eq!(parse_pollutant(Some("-3")), -3.0);
    }

    #[test]
    fn test_parse_pollutant_defaults_to_zero() {
        assert_eq!(parse_pollutant(None), 0.0);
        assert_eq!(parse_pollutant(Some("")), 0.0);
        assert_eq!(parse_pollutant(Some("N/A")), 0.0);
        assert_eq!(parse_pollutant(Some("NA")), 0.0);
        assert_eq!(parse_pollutant(Some("12,5")), 0.0);
    }

    #[test]
    fn test_parse_pollutant_passes_nan_through() {
        assert!(parse_pollutant(Some("nan")).is_nan());
    }

    #[test]
    fn test_single_pollutant_fills_rest_with_zero() {
        let readings =
            PollutantReadings::new().with(Pollutant::Pm25, PollutantReading::with_avg("55.2"));
        let features = build_features(&readings);
        assert_eq!(features.as_slice(), &[55.2, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_empty_readings_give_zero_vector() {
        let features = build_features(&PollutantReadings::new());
        assert_eq!(features.as_slice(), &[0.0; 6]);
        assert_eq!(features.as_slice().len(), 6);
    }

    #[test]
    fn test_non_numeric_avg_gives_zero_slot() {
        let readings = PollutantReadings::new()
            .with(Pollutant::Pm10, PollutantReading::with_avg("N/A"))
            .with(Pollutant::No2, PollutantReading::with_avg(""))
            .with(Pollutant::O3, PollutantReading::new(Some("1"), Some("9"), None))
            .with(Pollutant::Co, PollutantReading::with_avg("41"));
        let features = build_features(&readings);
        assert_eq!(features.as_slice(), &[0.0, 0.0, 0.0, 0.0, 41.0, 0.0]);
    }

    #[test]
    fn test_slots_follow_feature_order() {
        let mut readings = PollutantReadings::new();
        // Feed order differs from feature order.
        for (code, avg) in [
            ("O3", "6"),
            ("CO", "5"),
            ("SO2", "4"),
            ("NO2", "3"),
            ("PM10", "2"),
            ("PM2.5", "1"),
            ("NH3", "99"),
        ] {
            readings.insert(code, PollutantReading::with_avg(avg));
        }
        let features = build_features(&readings);
        assert_eq!(features.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(features.get(Pollutant::So2), 4.0);
    }

    #[test]
    fn test_to_row_shape() {
        let row = FeatureVector::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).to_row();
        assert_eq!(row.shape(), &[1, 6]);
        assert_eq!(row[[0, 5]], 6.0);
    }
}
