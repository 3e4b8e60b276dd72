//! Station coordinates and AQI severity tiers for map rendering.

use serde::Serialize;
use std::fmt;

/// Latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Known Mumbai monitoring stations, in lookup order.
pub static MUMBAI_STATIONS: &[(&str, [f64; 2])] = &[
    ("Bandra Kurla Complex, Mumbai - IITM", [19.0700, 72.8770]),
    ("Kandivali East, Mumbai - MPCB", [19.2120, 72.8560]),
    ("Mulund West, Mumbai - MPCB", [19.1800, 72.9500]),
    ("Borivali East, Mumbai - MPCB", [19.2840, 72.8580]),
    ("Chembur, Mumbai - MPCB", [19.0560, 72.8830]),
    (
        "Chhatrapati Shivaji Intl. Airport (T2), Mumbai - MPCB",
        [19.0886, 72.8656],
    ),
    ("Kherwadi_Bandra East, Mumbai - MPCB", [19.0800, 72.8500]),
    ("Khindipada-Bhandup West, Mumbai - IITM", [19.2000, 72.9400]),
    ("Kurla, Mumbai - MPCB", [19.0730, 72.8760]),
    ("Malad West, Mumbai - IITM", [19.1770, 72.8280]),
    ("Mazgaon, Mumbai - IITM", [18.9470, 72.8310]),
    ("Mindspace-Malad West, Mumbai - MPCB", [19.1640, 72.8500]),
    ("Navy Nagar-Colaba, Mumbai - IITM", [18.9360, 72.8170]),
    ("Powai, Mumbai - MPCB", [19.1230, 72.9110]),
    ("Siddharth Nagar-Worli, Mumbai - IITM", [19.0300, 72.8200]),
    ("Vasai West, Mumbai - MPCB", [19.4300, 72.8220]),
    ("Vile Parle West, Mumbai - MPCB", [19.0900, 72.8470]),
    ("Worli, Mumbai - MPCB", [18.9860, 72.8180]),
];

/// Ordered station name → coordinates table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTable {
    entries: Vec<(String, Coordinates)>,
}

impl Default for CoordinateTable {
    fn default() -> Self {
        Self::new(
            MUMBAI_STATIONS
                .iter()
                .map(|(name, [lat, lon])| (name.to_string(), Coordinates { lat: *lat, lon: *lon })),
        )
    }
}

impl CoordinateTable {
    pub fn new(entries: impl IntoIterator<Item = (String, Coordinates)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Finds the first entry whose name contains `station_name`, ignoring case
    /// and surrounding whitespace.
    ///
    /// Matching is by substring, so a short name can hit a longer entry
    /// (`"Worli"` matches `"Siddharth Nagar-Worli"` before `"Worli"`); the
    /// earliest entry in table order wins.
    pub fn resolve(&self, station_name: &str) -> Option<Coordinates> {
        let needle = station_name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(name, _)| name.to_lowercase().contains(&needle))
            .map(|(_, coords)| *coords)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coordinates)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Severity band of an AQI value.
///
/// | AQI       | Tier         | Color      |
/// |-----------|--------------|------------|
/// | <= 50     | Good         | green      |
/// | <= 100    | Satisfactory | lightgreen |
/// | <= 200    | Moderate     | orange     |
/// | <= 300    | Poor         | red        |
/// | <= 400    | VeryPoor     | purple     |
/// | > 400     | Severe       | maroon     |
/// | not a number | Unknown   | gray       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AqiTier {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
    Unknown,
}

impl AqiTier {
    pub fn from_value(aqi: i64) -> Self {
        match aqi {
            a if a <= 50 => AqiTier::Good,
            a if a <= 100 => AqiTier::Satisfactory,
            a if a <= 200 => AqiTier::Moderate,
            a if a <= 300 => AqiTier::Poor,
            a if a <= 400 => AqiTier::VeryPoor,
            _ => AqiTier::Severe,
        }
    }

    /// Tier of a displayed AQI. Only whole numbers are ranked; anything else
    /// (including `"N/A"` and decimals) is [`AqiTier::Unknown`].
    pub fn from_aqi(aqi: &str) -> Self {
        aqi.trim()
            .parse::<i64>()
            .map_or(AqiTier::Unknown, Self::from_value)
    }

    pub fn color(self) -> &'static str {
        match self {
            AqiTier::Good => "green",
            AqiTier::Satisfactory => "lightgreen",
            AqiTier::Moderate => "orange",
            AqiTier::Poor => "red",
            AqiTier::VeryPoor => "purple",
            AqiTier::Severe => "maroon",
            AqiTier::Unknown => "gray",
        }
    }
}

impl fmt::Display for AqiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
