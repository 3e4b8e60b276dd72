use ndarray::{Array1, Array2};
use serde::Deserialize;

use super::{ModelError, Transform, check_features};

const STAGE: &str = "scaler";

/// Fitted standardization: `(x - mean) / scale`.
///
/// Either vector may be absent when the scaler was fitted without centering
/// or without scaling. Zero-variance columns are expected to carry a scale of 1.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn new(mean: Option<Vec<f64>>, scale: Option<Vec<f64>>) -> Self {
        Self { mean, scale }
    }

    pub fn n_features_in(&self) -> usize {
        self.mean
            .as_ref()
            .or(self.scale.as_ref())
            .map_or(0, Vec::len)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: &str| ModelError::InvalidParams {
            stage: STAGE,
            reason: reason.to_string(),
        };

        if self.n_features_in() == 0 {
            return Err(invalid("neither mean nor scale is set"));
        }
        if let (Some(mean), Some(scale)) = (&self.mean, &self.scale) {
            if mean.len() != scale.len() {
                return Err(invalid("mean and scale lengths differ"));
            }
        }
        if let Some(scale) = &self.scale {
            if scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(invalid("scale must be finite and non-zero"));
            }
        }
        Ok(())
    }
}

impl Transform for StandardScaler {
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        check_features(STAGE, x, self.n_features_in())?;

        let mut out = x.clone();
        if let Some(mean) = &self.mean {
            out -= &Array1::from(mean.clone());
        }
        if let Some(scale) = &self.scale {
            out /= &Array1::from(scale.clone());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standardizes_each_column() {
        let scaler = StandardScaler::new(Some(vec![10.0, 0.0]), Some(vec![2.0, 4.0]));
        let out = scaler.transform(&array![[14.0, 2.0]]).unwrap();
        assert_eq!(out, array![[2.0, 0.5]]);
    }

    #[test]
    fn test_without_mean() {
        let scaler = StandardScaler::new(None, Some(vec![2.0, 2.0]));
        let out = scaler.transform(&array![[4.0, 1.0]]).unwrap();
        assert_eq!(out, array![[2.0, 0.5]]);
    }

    #[test]
    fn test_without_scale() {
        let scaler = StandardScaler::new(Some(vec![1.0, 1.0]), None);
        let out = scaler.transform(&array![[4.0, 1.0]]).unwrap();
        assert_eq!(out, array![[3.0, 0.0]]);
    }

    #[test]
    fn test_rejects_wrong_width() {
        let scaler = StandardScaler::new(Some(vec![0.0; 6]), Some(vec![1.0; 6]));
        assert!(matches!(
            scaler.transform(&array![[1.0, 2.0, 3.0, 4.0, 5.0]]),
            Err(ModelError::FeatureMismatch {
                expected: 6,
                got: 5,
                ..
            })
        ));
    }

    #[test]
    fn test_validate() {
        assert!(StandardScaler::new(None, None).validate().is_err());
        assert!(
            StandardScaler::new(Some(vec![0.0]), Some(vec![0.0]))
                .validate()
                .is_err()
        );
        assert!(
            StandardScaler::new(Some(vec![0.0, 1.0]), Some(vec![1.0]))
                .validate()
                .is_err()
        );
        assert!(
            StandardScaler::new(Some(vec![0.0]), Some(vec![3.0]))
                .validate()
                .is_ok()
        );
    }
}
