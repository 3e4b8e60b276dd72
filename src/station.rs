use crate::pollutant::PollutantReadings;

/// One monitoring station as reported by a single feed fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationRecord {
    pub name: String,
    pub last_update: Option<String>,
    /// AQI reported by the feed; may be empty.
    pub air_quality_index: Option<String>,
    pub predominant_parameter: Option<String>,
    pub pollutants: PollutantReadings,
}

impl StationRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// The reported AQI, if it is present and not blank.
    pub fn observed_aqi(&self) -> Option<&str> {
        self.air_quality_index
            .as_deref()
            .filter(|aqi| !aqi.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_aqi() {
        let mut record = StationRecord::new("Powai, Mumbai - MPCB");
        assert_eq!(record.observed_aqi(), None);

        record.air_quality_index = Some("  ".to_string());
        assert_eq!(record.observed_aqi(), None);

        record.air_quality_index = Some("142".to_string());
        assert_eq!(record.observed_aqi(), Some("142"));

        record.air_quality_index = Some("NA".to_string());
        assert_eq!(record.observed_aqi(), Some("NA"));
    }
}
