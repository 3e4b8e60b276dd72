//! Missing-value imputation with per-column statistics.

use ndarray::{Array2, Axis};
use serde::Deserialize;

use super::{ModelError, Transform, check_features};

const STAGE: &str = "imputer";

/// Which cell value counts as missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "MissingValuesRepr")]
pub enum MissingValues {
    #[default]
    Nan,
    Value(f64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MissingValuesRepr {
    Number(f64),
    Text(String),
}

impl TryFrom<MissingValuesRepr> for MissingValues {
    type Error = String;

    fn try_from(repr: MissingValuesRepr) -> Result<Self, Self::Error> {
        match repr {
            MissingValuesRepr::Number(v) => Ok(MissingValues::Value(v)),
            MissingValuesRepr::Text(s) if s.eq_ignore_ascii_case("nan") => Ok(MissingValues::Nan),
            MissingValuesRepr::Text(s) => Err(format!("unsupported missing_values marker '{s}'")),
        }
    }
}

impl MissingValues {
    fn matches(self, v: f64) -> bool {
        match self {
            MissingValues::Nan => v.is_nan(),
            MissingValues::Value(m) => v == m,
        }
    }
}

/// Fitted imputer: replaces missing cells with the column statistic seen at fit
/// time (mean, median or constant, whatever it was fitted with).
///
/// A `null` statistic marks a column that was entirely missing during fitting;
/// such columns are dropped from the output.
#[derive(Debug, Clone, Deserialize)]
pub struct SimpleImputer {
    #[serde(default)]
    pub missing_values: MissingValues,
    pub statistics: Vec<Option<f64>>,
}

impl SimpleImputer {
    pub fn new(missing_values: MissingValues, statistics: Vec<Option<f64>>) -> Self {
        Self {
            missing_values,
            statistics,
        }
    }

    pub fn n_features_in(&self) -> usize {
        self.statistics.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.statistics.is_empty() {
            return Err(ModelError::InvalidParams {
                stage: STAGE,
                reason: "no statistics".to_string(),
            });
        }
        if self.statistics.iter().all(Option::is_none) {
            return Err(ModelError::InvalidParams {
                stage: STAGE,
                reason: "every column is dropped".to_string(),
            });
        }
        Ok(())
    }
}

impl Transform for SimpleImputer {
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        check_features(STAGE, x, self.n_features_in())?;

        if let Some(((_, column), value)) = x.indexed_iter().find(|(_, v)| v.is_infinite()) {
            return Err(ModelError::InvalidInput {
                stage: STAGE,
                column,
                value: *value,
            });
        }

        let kept: Vec<(usize, f64)> = self
            .statistics
            .iter()
            .enumerate()
            .filter_map(|(j, s)| s.map(|s| (j, s)))
            .collect();

        let mut out = Array2::zeros((x.nrows(), kept.len()));
        for (row_in, mut row_out) in x.axis_iter(Axis(0)).zip(out.axis_iter_mut(Axis(0))) {
            for (k, (j, statistic)) in kept.iter().enumerate() {
                let v = row_in[*j];
                row_out[k] = if self.missing_values.matches(v) {
                    *statistic
                } else {
                    v
                };
            }
        }
        Ok(out)
    }
}
