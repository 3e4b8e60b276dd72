//! CLI entry point for the Mumbai AQI mapper.
//!
//! Fetches the CPCB air-quality feed, fills in missing AQI values with the
//! fitted model, and writes a station table and map.

use anyhow::{Context, Result};
use aqi_mapper::{
    config::AppConfig,
    features::build_features,
    fetch::{BasicClient, load_feed},
    geo::CoordinateTable,
    model::ModelArtifacts,
    output::{print_json, print_pretty, write_geojson, write_map_html, write_table},
    parser::parse_feed,
    pollutant::{Pollutant, PollutantReading, PollutantReadings},
    predictor::AqiPredictor,
    report::{Report, UNAVAILABLE, round_prediction},
};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aqi_mapper")]
#[command(about = "Fetch, fill in and map Mumbai air-quality readings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the feed, predict missing AQI values, and write the table and map
    Run {
        /// Feed URL or path to a saved feed document
        #[arg(short, long, value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// Directory holding imputer.json, scaler.json and rf_model.json
        #[arg(short, long)]
        models: Option<PathBuf>,

        /// CSV file to write the station table to
        #[arg(short, long)]
        table: Option<PathBuf>,

        /// Optional GeoJSON file for the station markers
        #[arg(long)]
        geojson: Option<PathBuf>,

        /// HTML file for the interactive map
        #[arg(long)]
        map: Option<PathBuf>,

        /// Skip writing the HTML map
        #[arg(long, default_value_t = false)]
        no_map: bool,

        /// Also log the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// State to read stations from
        #[arg(long)]
        state: Option<String>,

        /// City to read stations from
        #[arg(long)]
        city: Option<String>,
    },
    /// Predict AQI from pollutant averages entered by hand
    Predict {
        #[arg(long = "pm25")]
        pm25: Option<String>,
        #[arg(long)]
        pm10: Option<String>,
        #[arg(long)]
        no2: Option<String>,
        #[arg(long)]
        so2: Option<String>,
        #[arg(long)]
        co: Option<String>,
        #[arg(long)]
        o3: Option<String>,

        /// Directory holding the fitted model files
        #[arg(short, long)]
        models: Option<PathBuf>,
    },
    /// List the stations with known coordinates
    Stations,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aqi_mapper.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aqi_mapper.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", "info"));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", "debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();

    match cli.command {
        Commands::Run {
            source,
            models,
            table,
            geojson,
            map,
            no_map,
            json,
            state,
            city,
        } => {
            if let Some(source) = source {
                config.feed_source = source;
            }
            if let Some(models) = models {
                config.model_dir = models;
            }
            if let Some(table) = table {
                config.table_path = table;
            }
            if geojson.is_some() {
                config.geojson_path = geojson;
            }
            if map.is_some() {
                config.map_path = map;
            }
            if no_map {
                config.map_path = None;
            }
            if let Some(state) = state {
                config.filter.state = state;
            }
            if let Some(city) = city {
                config.filter.city = city;
            }

            run(&config, json).await?;
        }
        Commands::Predict {
            pm25,
            pm10,
            no2,
            so2,
            co,
            o3,
            models,
        } => {
            let model_dir = models.unwrap_or(config.model_dir);
            let predictor = load_predictor(&model_dir)?;

            let mut readings = PollutantReadings::new();
            for (pollutant, avg) in Pollutant::ALL.into_iter().zip([pm25, pm10, no2, so2, co, o3]) {
                if let Some(avg) = avg {
                    readings = readings.with(pollutant, PollutantReading::with_avg(&avg));
                }
            }

            let features = build_features(&readings);
            let aqi = predictor
                .predict(&features)
                .context("AQI prediction failed")?;
            match round_prediction(aqi) {
                Some(rounded) => info!(
                    features = ?features.as_slice(),
                    aqi = rounded,
                    raw = aqi,
                    "Predicted AQI"
                ),
                None => warn!(
                    features = ?features.as_slice(),
                    aqi = UNAVAILABLE,
                    raw = aqi,
                    "Model returned an unusable AQI"
                ),
            }
        }
        Commands::Stations => {
            let table = CoordinateTable::default();
            for (name, coords) in table.iter() {
                info!(station = name, lat = coords.lat, lon = coords.lon, "Station");
            }
            info!(total = table.len(), "Station list");
        }
    }

    Ok(())
}

fn env_filter(var: &str, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new(default))
}

fn load_predictor(model_dir: &Path) -> Result<AqiPredictor> {
    let artifacts = ModelArtifacts::load(model_dir).with_context(|| {
        format!(
            "Failed to load model artifacts from '{}'",
            model_dir.display()
        )
    })?;
    Ok(AqiPredictor::new(artifacts))
}

/// One fetch → parse → predict → render pass.
#[tracing::instrument(skip(config, json), fields(source = %config.feed_source))]
async fn run(config: &AppConfig, json: bool) -> Result<()> {
    let predictor = load_predictor(&config.model_dir)?;

    let client = BasicClient::new()?;
    let bytes = load_feed(&client, &config.feed_source).await?;
    let records = parse_feed(&bytes, &config.filter)?;

    if records.is_empty() {
        warn!(
            state = %config.filter.state,
            "{}",
            config.filter.no_data_message()
        );
        return Ok(());
    }

    let report = Report::build(&records, &predictor, &CoordinateTable::default());
    print_pretty(&report);
    if json {
        print_json(&report)?;
    }

    write_table(&config.table_path, &report)
        .with_context(|| format!("Failed to write table '{}'", config.table_path.display()))?;
    if let Some(path) = &config.geojson_path {
        write_geojson(path, &report)
            .with_context(|| format!("Failed to write GeoJSON '{}'", path.display()))?;
    }
    if let Some(path) = &config.map_path {
        write_map_html(path, &report)
            .with_context(|| format!("Failed to write map '{}'", path.display()))?;
    }

    info!(
        stations = report.rows.len(),
        predicted = report.predicted_count(),
        unavailable = report.unavailable_count(),
        on_map = report.markers.len(),
        unresolved = report.unresolved.len(),
        table = %config.table_path.display(),
        "Report written"
    );
    Ok(())
}
