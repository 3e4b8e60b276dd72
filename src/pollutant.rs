//! Pollutant codes and the per-station reading record.
//!
//! The six canonical pollutants are known at compile time. Their declaration
//! order is the feature order the AQI model was fitted with and must not change
//! without retraining.

use serde::Serialize;
use std::fmt;

/// A pollutant that feeds the AQI model, in model feature order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    So2,
    Co,
    O3,
}

impl Pollutant {
    /// Number of model features.
    pub const COUNT: usize = 6;

    /// All canonical pollutants in feature order.
    pub const ALL: [Pollutant; Pollutant::COUNT] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    /// The id used by the feed for this pollutant.
    pub fn code(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO2",
            Pollutant::So2 => "SO2",
            Pollutant::Co => "CO",
            Pollutant::O3 => "O3",
        }
    }

    /// Feature slot of this pollutant.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks up a canonical pollutant by its exact feed id.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raw min/max/avg strings for one pollutant, exactly as the feed reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollutantReading {
    pub min: Option<String>,
    pub max: Option<String>,
    pub avg: Option<String>,
}

impl PollutantReading {
    pub fn new(min: Option<&str>, max: Option<&str>, avg: Option<&str>) -> Self {
        Self {
            min: min.map(str::to_string),
            max: max.map(str::to_string),
            avg: avg.map(str::to_string),
        }
    }

    /// Reading that only carries an average.
    pub fn with_avg(avg: &str) -> Self {
        Self {
            avg: Some(avg.to_string()),
            ..Default::default()
        }
    }
}

/// Where a reading lives inside [`PollutantReadings`].
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Canonical(Pollutant),
    Other(usize),
}

/// All pollutant readings reported for a station.
///
/// Canonical pollutants live in fixed slots for the model; anything else the
/// feed reports (e.g. `NH3`) is kept in `others` for display only. `order`
/// remembers the feed order of both so the table can follow it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollutantReadings {
    canonical: [Option<PollutantReading>; Pollutant::COUNT],
    others: Vec<(String, PollutantReading)>,
    order: Vec<Slot>,
}

impl PollutantReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a reading under the feed's pollutant id. A repeated id replaces
    /// the earlier reading and keeps its first position.
    pub fn insert(&mut self, code: &str, reading: PollutantReading) {
        if let Some(pollutant) = Pollutant::from_code(code) {
            self.set(pollutant, reading);
            return;
        }
        match self.others.iter_mut().find(|(c, _)| c == code) {
            Some((_, existing)) => *existing = reading,
            None => {
                self.order.push(Slot::Other(self.others.len()));
                self.others.push((code.to_string(), reading));
            }
        }
    }

    /// Builder-style [`insert`](Self::insert) for a canonical pollutant.
    pub fn with(mut self, pollutant: Pollutant, reading: PollutantReading) -> Self {
        self.set(pollutant, reading);
        self
    }

    fn set(&mut self, pollutant: Pollutant, reading: PollutantReading) {
        let slot = &mut self.canonical[pollutant.index()];
        if slot.is_none() {
            self.order.push(Slot::Canonical(pollutant));
        }
        *slot = Some(reading);
    }

    pub fn get(&self, pollutant: Pollutant) -> Option<&PollutantReading> {
        self.canonical[pollutant.index()].as_ref()
    }

    /// Every reading present, in the order the feed first reported it.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PollutantReading)> {
        self.order.iter().filter_map(|slot| match *slot {
            Slot::Canonical(p) => self.get(p).map(|r| (p.code(), r)),
            Slot::Other(i) => self.others.get(i).map(|(c, r)| (c.as_str(), r)),
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
