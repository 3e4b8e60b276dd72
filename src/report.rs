//! Turns parsed stations into table rows and map markers.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, warn};

use crate::features::build_features;
use crate::geo::{AqiTier, Coordinates, CoordinateTable};
use crate::predictor::AqiPredictor;
use crate::station::StationRecord;

/// Marker shown when no AQI could be determined.
pub const UNAVAILABLE: &str = "N/A";

/// The AQI shown for a station.
#[derive(Debug, Clone, PartialEq)]
pub enum AqiValue {
    /// Reported by the feed, passed through unchanged.
    Observed(String),
    /// Model estimate, rounded half to even.
    Predicted(i64),
    Unavailable,
}

impl AqiValue {
    pub fn tier(&self) -> AqiTier {
        match self {
            AqiValue::Observed(raw) => AqiTier::from_aqi(raw),
            AqiValue::Predicted(aqi) => AqiTier::from_value(*aqi),
            AqiValue::Unavailable => AqiTier::Unknown,
        }
    }

    pub fn is_predicted(&self) -> bool {
        matches!(self, AqiValue::Predicted(_))
    }
}

impl fmt::Display for AqiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqiValue::Observed(raw) => f.write_str(raw),
            AqiValue::Predicted(aqi) => write!(f, "{aqi}"),
            AqiValue::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl Serialize for AqiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Rounds a model output to a whole AQI, half to even.
///
/// Returns `None` when the output is not finite or does not fit an `i64`.
pub fn round_prediction(aqi: f64) -> Option<i64> {
    let rounded = aqi.round_ties_even();
    // `i64::MAX as f64` is 2^63, one past the largest value.
    (rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64)
        .then_some(rounded as i64)
}

/// Uses the reported AQI when present, otherwise asks the model.
///
/// A prediction failure, or an output that is not a usable number, yields
/// [`AqiValue::Unavailable`] for this station only.
pub fn resolve_aqi(record: &StationRecord, predictor: &AqiPredictor) -> AqiValue {
    if let Some(observed) = record.observed_aqi() {
        return AqiValue::Observed(observed.to_string());
    }

    let features = build_features(&record.pollutants);
    match predictor.predict(&features) {
        Ok(aqi) => match round_prediction(aqi) {
            Some(rounded) => {
                debug!(station = %record.name, aqi = rounded, "AQI filled from model");
                AqiValue::Predicted(rounded)
            }
            None => {
                warn!(station = %record.name, raw = aqi, "Model returned an unusable AQI");
                AqiValue::Unavailable
            }
        },
        Err(e) => {
            warn!(station = %record.name, error = %e, "AQI prediction failed");
            AqiValue::Unavailable
        }
    }
}

/// One table row. Pollutant columns are flattened as `(column, value)` pairs.
#[derive(Debug, Clone, Serialize)]
pub struct StationRow {
    pub station_name: String,
    pub last_update: Option<String>,
    pub air_quality_index: AqiValue,
    pub predominant_parameter: Option<String>,
    pub pollutant_columns: Vec<(String, Option<String>)>,
}

impl StationRow {
    pub const FIXED_COLUMNS: [&'static str; 4] = [
        "Station Name",
        "Last Update",
        "Air Quality Index",
        "Predominant Parameter",
    ];

    pub fn new(record: &StationRecord, aqi: AqiValue) -> Self {
        let pollutant_columns = record
            .pollutants
            .iter()
            .flat_map(|(code, reading)| {
                [
                    (format!("{code} Min"), reading.min.clone()),
                    (format!("{code} Max"), reading.max.clone()),
                    (format!("{code} Avg"), reading.avg.clone()),
                ]
            })
            .collect();

        Self {
            station_name: record.name.clone(),
            last_update: record.last_update.clone(),
            air_quality_index: aqi,
            predominant_parameter: record.predominant_parameter.clone(),
            pollutant_columns,
        }
    }

    /// Value of a column by its header name; `None` for absent or empty cells.
    pub fn cell(&self, column: &str) -> Option<String> {
        match column {
            "Station Name" => Some(self.station_name.clone()),
            "Last Update" => self.last_update.clone(),
            "Air Quality Index" => Some(self.air_quality_index.to_string()),
            "Predominant Parameter" => self.predominant_parameter.clone(),
            _ => self
                .pollutant_columns
                .iter()
                .find(|(c, _)| c == column)
                .and_then(|(_, v)| v.clone()),
        }
    }
}

/// A station placed on the map.
#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub station_name: String,
    pub coordinates: Coordinates,
    pub aqi: AqiValue,
    pub tier: AqiTier,
    pub color: &'static str,
    pub popup: String,
}

impl MapMarker {
    pub fn new(station_name: &str, coordinates: Coordinates, aqi: AqiValue) -> Self {
        let tier = aqi.tier();
        Self {
            station_name: station_name.to_string(),
            coordinates,
            popup: format!("{station_name}<br>AQI: {aqi}"),
            aqi,
            tier,
            color: tier.color(),
        }
    }
}

/// Everything the presentation layer needs for one feed fetch.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<StationRow>,
    pub markers: Vec<MapMarker>,
    /// Stations kept in the table but missing from the map.
    pub unresolved: Vec<String>,
}

impl Report {
    /// Builds rows and markers for every record, in feed order.
    pub fn build(
        records: &[StationRecord],
        predictor: &AqiPredictor,
        table: &CoordinateTable,
    ) -> Self {
        let mut report = Report {
            generated_at: Utc::now(),
            rows: Vec::with_capacity(records.len()),
            markers: Vec::new(),
            unresolved: Vec::new(),
        };

        for record in records {
            let aqi = resolve_aqi(record, predictor);

            match table.resolve(&record.name) {
                Some(coords) => report
                    .markers
                    .push(MapMarker::new(&record.name, coords, aqi.clone())),
                None => {
                    warn!(station = %record.name, "Coordinates not found for station");
                    report.unresolved.push(record.name.clone());
                }
            }

            report.rows.push(StationRow::new(record, aqi));
        }

        report
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn predicted_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.air_quality_index.is_predicted())
            .count()
    }

    pub fn unavailable_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.air_quality_index == AqiValue::Unavailable)
            .count()
    }

    /// Table header: fixed columns, then pollutant columns in order of first
    /// appearance across rows.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = StationRow::FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect();
        for row in &self.rows {
            for (column, _) in &row.pollutant_columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }
        columns
    }
}
