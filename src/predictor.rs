//! Three-stage AQI inference: impute, scale, regress.

use thiserror::Error;
use tracing::debug;

use crate::features::FeatureVector;
use crate::model::{ModelArtifacts, ModelError};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("imputation failed")]
    Impute(#[source] ModelError),

    #[error("scaling failed")]
    Scale(#[source] ModelError),

    #[error("regression failed")]
    Regress(#[source] ModelError),

    #[error("regressor returned no output")]
    EmptyOutput,
}

/// Estimates AQI from a [`FeatureVector`] using loaded model stages.
///
/// Holds only shared read-only stages, so one predictor can serve any number
/// of stations and threads.
#[derive(Clone)]
pub struct AqiPredictor {
    artifacts: ModelArtifacts,
}

impl AqiPredictor {
    pub fn new(artifacts: ModelArtifacts) -> Self {
        Self { artifacts }
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError> {
        let x = features.to_row();
        let imputed = self
            .artifacts
            .imputer
            .transform(&x)
            .map_err(PredictError::Impute)?;
        let scaled = self
            .artifacts
            .scaler
            .transform(&imputed)
            .map_err(PredictError::Scale)?;
        let output = self
            .artifacts
            .regressor
            .predict(&scaled)
            .map_err(PredictError::Regress)?;

        let aqi = output.first().copied().ok_or(PredictError::EmptyOutput)?;
        debug!(features = ?features.as_slice(), aqi, "AQI predicted");
        Ok(aqi)
    }
}
