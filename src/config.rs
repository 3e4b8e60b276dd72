use std::path::PathBuf;

use crate::parser::StationFilter;

pub const DEFAULT_FEED_URL: &str = "https://airquality.cpcb.gov.in/caaqms/rss_feed";
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Settings for one pipeline run.
///
/// `AQI_FEED_URL` and `AQI_MODEL_DIR` override the built-in defaults; explicit
/// CLI values override both.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub feed_source: String,
    pub model_dir: PathBuf,
    pub filter: StationFilter,
    pub table_path: PathBuf,
    pub geojson_path: Option<PathBuf>,
    pub map_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_source: DEFAULT_FEED_URL.to_string(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            filter: StationFilter::default(),
            table_path: PathBuf::from("aqi_stations.csv"),
            geojson_path: None,
            map_path: Some(PathBuf::from("aqi_map.html")),
        }
    }
}

impl AppConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("AQI_FEED_URL").filter(|v| !v.is_empty()) {
            config.feed_source = url;
        }
        if let Some(dir) = lookup("AQI_MODEL_DIR").filter(|v| !v.is_empty()) {
            config.model_dir = PathBuf::from(dir);
        }
        config
    }
}
