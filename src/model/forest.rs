//! Random-forest classifier loaded from a JSON artifact.
//!
//! Each tree is stored as flattened node arrays in the layout tree learners export
//! (`children_left`, `children_right`, `feature`, `threshold`, `value`). A node whose
//! children are both `-1` is a leaf; `value` holds its class weights `[stay, leave]`.
//! Rows go left when `x[feature] <= threshold`.

use serde::Deserialize;
use tracing::debug;

use super::RiskClassifier;
use super::error::{ClassifierError, ModelError};

const LEAF: i64 = -1;
const DEFAULT_MODEL_TYPE: &str = "Random Forest (4 Fields)";

#[derive(Debug, Clone, Deserialize)]
struct TreeArrays {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ForestFile {
    #[serde(default)]
    model_type: Option<String>,
    n_features: usize,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    #[serde(default)]
    feature_importances: Option<Vec<f64>>,
    trees: Vec<TreeArrays>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        probability: f64,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_arrays(
        tree_idx: usize,
        arrays: TreeArrays,
        n_features: usize,
    ) -> Result<Self, ModelError> {
        let len = arrays.children_left.len();
        let invalid = |reason: String| ModelError::InvalidForest {
            reason: format!("tree {}: {}", tree_idx, reason),
        };

        if len == 0 {
            return Err(invalid("has no nodes".to_string()));
        }
        if arrays.children_right.len() != len
            || arrays.feature.len() != len
            || arrays.threshold.len() != len
            || arrays.value.len() != len
        {
            return Err(invalid("node arrays have different lengths".to_string()));
        }

        let mut nodes = Vec::with_capacity(len);
        for i in 0..len {
            let left = arrays.children_left[i];
            let right = arrays.children_right[i];

            if left == LEAF && right == LEAF {
                let weights = &arrays.value[i];
                if weights.len() != 2 {
                    return Err(invalid(format!(
                        "node {} has {} class weights, expected 2",
                        i,
                        weights.len()
                    )));
                }
                let total = weights[0] + weights[1];
                if !total.is_finite() || total <= 0.0 || weights[0] < 0.0 || weights[1] < 0.0 {
                    return Err(invalid(format!("node {} has invalid class weights", i)));
                }
                nodes.push(Node::Leaf {
                    probability: weights[1] / total,
                });
                continue;
            }

            // Children always come after their parent, which also rules out cycles.
            let child = |c: i64| -> Option<usize> {
                usize::try_from(c).ok().filter(|&c| c > i && c < len)
            };
            let (Some(left), Some(right)) = (child(left), child(right)) else {
                return Err(invalid(format!("node {} has out-of-range children", i)));
            };

            let feature = usize::try_from(arrays.feature[i])
                .ok()
                .filter(|&f| f < n_features)
                .ok_or_else(|| invalid(format!("node {} splits on an unknown feature", i)))?;

            let threshold = arrays.threshold[i];
            if !threshold.is_finite() {
                return Err(invalid(format!("node {} has a non-finite threshold", i)));
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left,
                right,
            });
        }

        Ok(Self { nodes })
    }

    fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { probability } => return probability,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[feature] <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

/// Tree-ensemble classifier: the attrition probability is the mean leaf probability
/// across all trees.
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    model_type: String,
    n_features: usize,
    feature_names: Option<Vec<String>>,
    feature_importances: Option<Vec<f64>>,
    trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    /// Parses and validates a forest artifact.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let file: ForestFile =
            serde_json::from_slice(bytes).map_err(|e| ModelError::InvalidForest {
                reason: e.to_string(),
            })?;
        Self::from_file(file)
    }

    fn from_file(file: ForestFile) -> Result<Self, ModelError> {
        if file.n_features == 0 {
            return Err(ModelError::InvalidForest {
                reason: "n_features must be positive".to_string(),
            });
        }
        if file.trees.is_empty() {
            return Err(ModelError::InvalidForest {
                reason: "forest has no trees".to_string(),
            });
        }
        if let Some(importances) = &file.feature_importances
            && importances.len() != file.n_features
        {
            return Err(ModelError::InvalidForest {
                reason: format!(
                    "{} feature importances for {} features",
                    importances.len(),
                    file.n_features
                ),
            });
        }

        let n_features = file.n_features;
        let trees = file
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, arrays)| DecisionTree::from_arrays(i, arrays, n_features))
            .collect::<Result<Vec<_>, _>>()?;

        let mut forest = Self {
            model_type: file
                .model_type
                .unwrap_or_else(|| DEFAULT_MODEL_TYPE.to_string()),
            n_features,
            feature_names: None,
            feature_importances: file.feature_importances,
            trees,
        };
        if let Some(names) = file.feature_names {
            forest = forest.with_feature_names(names)?;
        }

        debug!(
            trees = forest.trees.len(),
            n_features = forest.n_features,
            "Forest classifier parsed"
        );

        Ok(forest)
    }

    /// Attaches feature names when the forest artifact itself does not carry them.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self, ModelError> {
        if names.len() != self.n_features {
            return Err(ModelError::InvalidFeatureNames {
                reason: format!(
                    "{} names for a model with {} features",
                    names.len(),
                    self.n_features
                ),
            });
        }
        self.feature_names = Some(names);
        Ok(self)
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl RiskClassifier for ForestClassifier {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        if features.len() != self.n_features {
            return Err(ClassifierError::FeatureCountMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let total: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        Ok(total / self.trees.len() as f64)
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }

    fn model_type(&self) -> &str {
        &self.model_type
    }
}
