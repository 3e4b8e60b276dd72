pub mod config;
pub mod features;
pub mod fetch;
pub mod geo;
pub mod model;
pub mod output;
pub mod parser;
pub mod pollutant;
pub mod predictor;
pub mod report;
pub mod station;
