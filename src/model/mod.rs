//! Pre-fitted AQI model stages.
//!
//! The three stages are fitted elsewhere and exported as JSON parameter dumps
//! into one directory:
//!
//! | File            | Stage                       | Type                          |
//! |-----------------|-----------------------------|-------------------------------|
//! | `imputer.json`  | missing-value replacement   | [`imputer::SimpleImputer`]    |
//! | `scaler.json`   | standardization             | [`scaler::StandardScaler`]    |
//! | `rf_model.json` | random forest regression    | [`forest::RandomForest`]      |
//!
//! Loaded stages are immutable and shared behind [`Arc`].

pub mod forest;
pub mod imputer;
pub mod scaler;

pub use forest::{RandomForest, RegressionTree};
pub use imputer::{MissingValues, SimpleImputer};
pub use scaler::StandardScaler;

use ndarray::{Array1, Array2};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub const IMPUTER_FILE: &str = "imputer.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const REGRESSOR_FILE: &str = "rf_model.json";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{stage} expects {expected} features, got {got}")]
    FeatureMismatch {
        stage: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{stage} input contains {value} at column {column}")]
    InvalidInput {
        stage: &'static str,
        column: usize,
        value: f64,
    },

    #[error("{stage} parameters are inconsistent: {reason}")]
    InvalidParams { stage: &'static str, reason: String },

    #[error("Failed to read model file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode model file '{0}'")]
    Decode(PathBuf, #[source] serde_json::Error),
}

/// A fitted stage mapping a sample matrix to another sample matrix.
pub trait Transform: Send + Sync {
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError>;
}

/// A fitted model producing one output per sample row.
pub trait Regressor: Send + Sync {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;
}

/// Errors if `x` does not have the column count a stage was fitted with.
pub(crate) fn check_features(
    stage: &'static str,
    x: &Array2<f64>,
    expected: usize,
) -> Result<(), ModelError> {
    if x.ncols() != expected {
        return Err(ModelError::FeatureMismatch {
            stage,
            expected,
            got: x.ncols(),
        });
    }
    Ok(())
}

/// The three loaded stages, in application order.
#[derive(Clone)]
pub struct ModelArtifacts {
    pub imputer: Arc<dyn Transform>,
    pub scaler: Arc<dyn Transform>,
    pub regressor: Arc<dyn Regressor>,
}

impl ModelArtifacts {
    pub fn new(
        imputer: Arc<dyn Transform>,
        scaler: Arc<dyn Transform>,
        regressor: Arc<dyn Regressor>,
    ) -> Self {
        Self {
            imputer,
            scaler,
            regressor,
        }
    }

    /// Loads and validates all three stages from `dir`.
    #[tracing::instrument(skip(dir), fields(dir = %dir.display()))]
    pub fn load(dir: &Path) -> Result<Self, ModelError> {
        let imputer: SimpleImputer = read_json(&dir.join(IMPUTER_FILE))?;
        imputer.validate()?;
        let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;
        scaler.validate()?;
        let forest: RandomForest = read_json(&dir.join(REGRESSOR_FILE))?;
        forest.validate()?;

        info!(
            imputer_features = imputer.n_features_in(),
            scaler_features = scaler.n_features_in(),
            trees = forest.n_trees(),
            "Model artifacts loaded"
        );

        Ok(Self::new(Arc::new(imputer), Arc::new(scaler), Arc::new(forest)))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ModelError::Read(path.to_path_buf(), e))?;
    serde_json::from_str(&content).map_err(|e| ModelError::Decode(path.to_path_buf(), e))
}
