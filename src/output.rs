//! Output formatting and persistence for AQI reports.
//!
//! Supports pretty-printing, JSON serialization, a CSV table, and a map as
//! GeoJSON or a standalone Leaflet page.

use anyhow::Result;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::report::Report;
use csv::WriterBuilder;
use std::fs::File;
use std::path::Path;

/// Map centre (Mumbai) and initial zoom.
pub const MAP_CENTER: [f64; 2] = [19.0760, 72.8777];
pub const MAP_ZOOM: u8 = 12;

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &Report) {
    debug!("{:#?}", report);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &Report) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes the station table as CSV, replacing any existing file.
///
/// The first column is the 1-based row number; empty cells stay empty.
pub fn write_table(path: &Path, report: &Report) -> Result<()> {
    let columns = report.columns();
    debug!(path = %path.display(), columns = columns.len(), "Writing CSV table");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().from_writer(file);

    let mut header = vec![String::new()];
    header.extend(columns.iter().cloned());
    writer.write_record(&header)?;

    for (i, row) in report.rows.iter().enumerate() {
        let mut record = vec![(i + 1).to_string()];
        record.extend(columns.iter().map(|c| row.cell(c).unwrap_or_default()));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Map markers as a GeoJSON `FeatureCollection`.
pub fn to_geojson(report: &Report) -> Value {
    let features: Vec<Value> = report
        .markers
        .iter()
        .map(|m| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [m.coordinates.lon, m.coordinates.lat],
                },
                "properties": {
                    "station_name": m.station_name,
                    "aqi": m.aqi,
                    "tier": m.tier,
                    "color": m.color,
                    "popup": m.popup,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

pub fn write_geojson(path: &Path, report: &Report) -> Result<()> {
    debug!(path = %path.display(), markers = report.markers.len(), "Writing GeoJSON");
    std::fs::write(path, serde_json::to_string_pretty(&to_geojson(report))?)?;
    Ok(())
}

/// Renders a self-contained Leaflet page showing every marker.
pub fn render_map_html(report: &Report) -> Result<String> {
    let geojson = serde_json::to_string(&to_geojson(report))?;
    let [lat, lon] = MAP_CENTER;

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>AQI Station Locations</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>#map {{ width: 900px; height: 700px; }}</style>
</head>
<body>
<h3>AQI Station Locations</h3>
<div id="map"></div>
<script>
const map = L.map("map").setView([{lat}, {lon}], {zoom});
L.tileLayer("https://{{s}}.tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png", {{
  attribution: "&copy; OpenStreetMap contributors"
}}).addTo(map);
const stations = {geojson};
L.geoJSON(stations, {{
  pointToLayer: (feature, latlng) => L.circleMarker(latlng, {{
    radius: 9, color: feature.properties.color, fillColor: feature.properties.color, fillOpacity: 0.85
  }}),
  onEachFeature: (feature, layer) => layer.bindPopup(feature.properties.popup)
}}).addTo(map);
</script>
</body>
</html>
"#,
        zoom = MAP_ZOOM,
    ))
}

pub fn write_map_html(path: &Path, report: &Report) -> Result<()> {
    debug!(path = %path.display(), "Writing HTML map");
    std::fs::write(path, render_map_html(report)?)?;
    Ok(())
}
