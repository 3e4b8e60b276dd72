//! XML parser for the CPCB air-quality feed.
//!
//! The feed nests `Country > State > City > Station`. Each station carries
//! `Pollutant_Index` readings and an optional `Air_Quality_Index` summary.

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::fetch::FeedError;
use crate::pollutant::{PollutantReading, PollutantReadings};
use crate::station::StationRecord;

/// Selects which stations of the feed are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct StationFilter {
    pub state: String,
    pub city: String,
    /// A station is kept if its id contains any of these.
    pub operators: Vec<String>,
}

impl Default for StationFilter {
    fn default() -> Self {
        Self {
            state: "Maharashtra".to_string(),
            city: "Mumbai".to_string(),
            operators: vec!["MPCB".to_string(), "IITM".to_string()],
        }
    }
}

impl StationFilter {
    fn keeps(&self, station_id: &str) -> bool {
        self.operators.iter().any(|op| station_id.contains(op.as_str()))
    }

    /// Message logged when the filter selects nothing.
    pub fn no_data_message(&self) -> String {
        format!(
            "No data available for {} stations in {}.",
            self.operators.join(" or "),
            self.city
        )
    }
}

/// Parses a feed document into the stations matching `filter`.
///
/// Stations without an `Air_Quality_Index` element are skipped with a warning.
///
/// # Errors
///
/// Returns [`FeedError::Xml`] if the bytes are not a well-formed UTF-8 XML document.
pub fn parse_feed(bytes: &[u8], filter: &StationFilter) -> Result<Vec<StationRecord>, FeedError> {
    let text = std::str::from_utf8(bytes).map_err(|e| FeedError::Xml(e.to_string()))?;
    let doc = Document::parse(text).map_err(|e| FeedError::Xml(e.to_string()))?;

    let mut records = Vec::new();

    let cities = children(doc.root_element(), "Country")
        .flat_map(|country| children(country, "State"))
        .filter(|state| state.attribute("id") == Some(filter.state.as_str()))
        .flat_map(|state| children(state, "City"))
        .filter(|city| city.attribute("id") == Some(filter.city.as_str()));

    for city in cities {
        for station in children(city, "Station") {
            let name = station.attribute("id").unwrap_or_default().trim();
            if !filter.keeps(name) {
                continue;
            }

            let Some(aqi) = children(station, "Air_Quality_Index").next() else {
                warn!(station = name, "No Air Quality Index data for station");
                continue;
            };

            let mut pollutants = PollutantReadings::new();
            for index in children(station, "Pollutant_Index") {
                let Some(id) = index.attribute("id") else {
                    debug!(station = name, "Pollutant_Index without id ignored");
                    continue;
                };
                pollutants.insert(
                    id,
                    PollutantReading::new(
                        index.attribute("Min"),
                        index.attribute("Max"),
                        index.attribute("Avg"),
                    ),
                );
            }

            records.push(StationRecord {
                name: name.to_string(),
                last_update: station.attribute("lastupdate").map(str::to_string),
                air_quality_index: aqi.attribute("Value").map(str::to_string),
                predominant_parameter: aqi
                    .attribute("Predominant_Parameter")
                    .map(str::to_string),
                pollutants,
            });
        }
    }

    debug!(stations = records.len(), "Feed parsed");
    Ok(records)
}

/// Direct element children of `node` with the given tag name.
fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.has_tag_name(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pollutant::Pollutant;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<AqIndex>
  <Country id="India">
    <State id="Delhi">
      <City id="Delhi">
        <Station id="Anand Vihar, Delhi - DPCC" lastupdate="19-10-2026 10:00:00">
          <Air_Quality_Index Value="301" Predominant_Parameter="PM2.5"/>
        </Station>
      </City>
    </State>
    <State id="Maharashtra">
      <City id="Pune">
        <Station id="Shivajinagar, Pune - IITM" lastupdate="19-10-2026 10:00:00">
          <Air_Quality_Index Value="80" Predominant_Parameter="PM10"/>
        </Station>
      </City>
      <City id="Mumbai">
        <Station id=" Worli, Mumbai - MPCB " lastupdate="19-10-2026 10:00:00">
          <Pollutant_Index id="PM2.5" Min="20" Max="90" Avg="55"/>
          <Pollutant_Index id="NH3" Min="1" Max="4" Avg="2"/>
          <Air_Quality_Index Value="142" Predominant_Parameter="PM10"/>
        </Station>
        <Station id="Colaba, Mumbai - BMC" lastupdate="19-10-2026 10:00:00">
          <Air_Quality_Index Value="60" Predominant_Parameter="O3"/>
        </Station>
        <Station id="Powai, Mumbai - MPCB" lastupdate="19-10-2026 10:00:00">
          <Pollutant_Index id="CO" Min="5" Max="40" Avg="NA"/>
        </Station>
        <Station id="Mazgaon, Mumbai - IITM" lastupdate="19-10-2026 09:00:00">
          <Pollutant_Index id="O3" Min="3" Max="70"/>
          <Air_Quality_Index Value="" Predominant_Parameter="O3"/>
        </Station>
      </City>
    </State>
  </Country>
</AqIndex>"#;

    #[test]
    fn test_parse_selects_mumbai_operator_stations() {
        let records = parse_feed(FEED.as_bytes(), &StationFilter::default()).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        // Colaba is not MPCB/IITM; Powai has no AQI element.
        assert_eq!(names, ["Worli, Mumbai - MPCB", "Mazgaon, Mumbai - IITM"]);
    }

    #[test]
    fn test_parse_station_fields() {
        let records = parse_feed(FEED.as_bytes(), &StationFilter::default()).unwrap();
        let worli = &records[0];
        assert_eq!(worli.last_update.as_deref(), Some("19-10-2026 10:00:00"));
        assert_eq!(worli.air_quality_index.as_deref(), Some("142"));
        assert_eq!(worli.predominant_parameter.as_deref(), Some("PM10"));
        assert_eq!(worli.pollutants.len(), 2);
        let pm25 = worli.pollutants.get(Pollutant::Pm25).unwrap();
        assert_eq!(pm25.min.as_deref(), Some("20"));
        assert_eq!(pm25.max.as_deref(), Some("90"));
        assert_eq!(pm25.avg.as_deref(), Some("55"));

        let mazgaon = &records[1];
        assert_eq!(mazgaon.air_quality_index.as_deref(), Some(""));
        assert_eq!(mazgaon.observed_aqi(), None);
        assert_eq!(mazgaon.pollutants.get(Pollutant::O3).unwrap().avg, None);
    }

    #[test]
    fn test_parse_custom_filter() {
        let filter = StationFilter {
            city: "Pune".to_string(),
            ..Default::default()
        };
        let records = parse_feed(FEED.as_bytes(), &filter).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Shivajinagar, Pune - IITM");
    }

    #[test]
    fn test_parse_no_matching_city() {
        let filter = StationFilter {
            state: "Kerala".to_string(),
            ..Default::default()
        };
        assert!(parse_feed(FEED.as_bytes(), &filter).unwrap().is_empty());
    }

    #[test]
    fn test_no_data_message() {
        assert_eq!(
            StationFilter::default().no_data_message(),
            "No data available for MPCB or IITM stations in Mumbai."
        );
        let filter = StationFilter {
            city: "Pune".to_string(),
            operators: vec!["IITM".to_string()],
            ..Default::default()
        };
        assert_eq!(
            filter.no_data_message(),
            "No data available for IITM stations in Pune."
        );
    }

    #[test]
    fn test_parse_malformed_xml() {
        let result = parse_feed(b"<AqIndex><Country>", &StationFilter::default());
        assert!(matches!(result, Err(FeedError::Xml(_))));
    }

    #[test]
    fn test_parse_invalid_utf8() {
        let result = parse_feed(&[0xFF, 0xFE, 0x00], &StationFilter::default());
        assert!(matches!(result, Err(FeedError::Xml(_))));
    }
}
