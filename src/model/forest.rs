//! Random forest regressor over flattened binary trees.
//!
//! Each tree is stored as parallel node arrays. Node 0 is the root; a node
//! whose `children_left` is [`LEAF`] is a leaf and its `value` is the
//! prediction. Children always come after their parent.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Deserialize;

use super::{ModelError, Regressor, check_features};

const STAGE: &str = "regressor";

/// Child index marking a leaf.
pub const LEAF: i64 = -1;

#[derive(Debug, Clone, Deserialize)]
pub struct RegressionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl RegressionTree {
    /// A tree made of a single leaf.
    pub fn leaf(value: f64) -> Self {
        Self {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    fn node_count(&self) -> usize {
        self.value.len()
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err("node arrays differ in length".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {node} has only a right child"));
                }
                continue;
            }
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {node} has invalid child {child}"));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {node} splits on unknown feature {feature}"));
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            // Splits were learned on single-precision inputs.
            let x = row[self.feature[node] as usize] as f32 as f64;
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}

/// Averages the predictions of its trees.
///
/// [`RandomForest::new`] validates its trees. A deserialized forest must be
/// [`validate`](RandomForest::validate)d before it predicts.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    n_features_in: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(n_features_in: usize, trees: Vec<RegressionTree>) -> Result<Self, ModelError> {
        let forest = Self {
            n_features_in,
            trees,
        };
        forest.validate()?;
        Ok(forest)
    }

    pub fn n_features_in(&self) -> usize {
        self.n_features_in
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidParams {
                stage: STAGE,
                reason: "forest has no trees".to_string(),
            });
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features_in)
                .map_err(|reason| ModelError::InvalidParams {
                    stage: STAGE,
                    reason: format!("tree {i}: {reason}"),
                })?;
        }
        Ok(())
    }
}

impl Regressor for RandomForest {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        check_features(STAGE, x, self.n_features_in)?;

        if let Some(((_, column), value)) = x.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ModelError::InvalidInput {
                stage: STAGE,
                column,
                value: *value,
            });
        }

        let n_trees = self.trees.len() as f64;
        let predictions = x
            .axis_iter(Axis(0))
            .map(|row| {
                self.trees
                    .iter()
                    .map(|tree| tree.predict_row(row))
                    .sum::<f64>()
                    / n_trees
            })
            .collect();
        Ok(predictions)
    }
}
