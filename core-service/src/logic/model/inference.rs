//! Inference Engine - tree ensemble regressor
//!
//! Load and run a LightGBM model dump.
//! The output of a regression ensemble is the plain sum of the leaf values
//! reached in every tree (the initial score is folded into the first tree).

use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::lightgbm::ModelDump;
use super::tree::{Node, Tree};
use super::ModelError;

/// Objectives whose raw score is already the prediction
const IDENTITY_OBJECTIVES: &[&str] = &[
    "regression",
    "regression_l1",
    "regression_l2",
    "l1",
    "l2",
    "mae",
    "mse",
    "huber",
    "fair",
    "quantile",
    "mape",
];

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub objective: String,
    pub num_trees: usize,
    pub features: usize,
    pub max_depth: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// REGRESSOR TRAIT
// ============================================================================

/// Anything that maps a rows × features matrix to one price per row
pub trait Regressor: Send + Sync {
    fn feature_names(&self) -> &[String];

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>, ModelError>;
}

// ============================================================================
// TREE ENSEMBLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    feature_names: Vec<String>,
    trees: Vec<Tree>,
    categorical_levels: Option<Vec<Vec<String>>>,
    metadata: ModelMetadata,
}

impl TreeEnsemble {
    pub fn new(feature_names: Vec<String>, trees: Vec<Tree>) -> Result<Self, ModelError> {
        let metadata = ModelMetadata {
            model_path: "<memory>".to_string(),
            model_type: "gbdt".to_string(),
            objective: "regression".to_string(),
            num_trees: trees.len(),
            features: feature_names.len(),
            max_depth: trees.iter().map(Tree::max_depth).max().unwrap_or(0),
            loaded_at: chrono::Utc::now(),
        };
        let ensemble = Self {
            feature_names,
            trees,
            categorical_levels: None,
            metadata,
        };
        ensemble.validate()?;
        Ok(ensemble)
    }

    pub fn from_dump(dump: &ModelDump) -> Result<Self, ModelError> {
        if dump.num_class != 1 || dump.num_tree_per_iteration != 1 {
            return Err(ModelError::MultiOutput(dump.num_class.max(dump.num_tree_per_iteration)));
        }

        let objective = dump.objective.split_whitespace().next().unwrap_or("regression");
        if !IDENTITY_OBJECTIVES.contains(&objective) {
            return Err(ModelError::UnsupportedObjective(dump.objective.clone()));
        }

        let trees = dump
            .tree_info
            .iter()
            .map(|info| info.to_tree())
            .collect::<Result<Vec<_>, _>>()?;

        let mut ensemble = Self::new(dump.feature_names.clone(), trees)?;
        ensemble.metadata.objective = objective.to_string();
        ensemble.categorical_levels = dump.categorical_levels();
        Ok(ensemble)
    }

    /// Load a model dump from disk
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        log::info!("Loading tree model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ModelError::NotFound(model_path.display().to_string()));
        }

        let text = std::fs::read_to_string(model_path)?;
        let dump = ModelDump::from_json(&text)?;
        let mut ensemble = Self::from_dump(&dump)?;
        ensemble.metadata.model_path = model_path.display().to_string();

        log::info!(
            "Tree model loaded: {} trees, {} features, max depth {}",
            ensemble.metadata.num_trees,
            ensemble.metadata.features,
            ensemble.metadata.max_depth
        );
        Ok(ensemble)
    }

    /// Structural checks TreeSHAP relies on
    fn validate(&self) -> Result<(), ModelError> {
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.is_empty() {
                return Err(ModelError::Malformed(format!("tree {} has no nodes", t)));
            }
            for node in tree.nodes() {
                if let Node::Split { feature, left, right, count, .. } = node {
                    if *feature >= self.feature_names.len() {
                        return Err(ModelError::Malformed(format!(
                            "tree {} splits on feature {} of {}",
                            t,
                            feature,
                            self.feature_names.len()
                        )));
                    }
                    if *left >= tree.len() || *right >= tree.len() {
                        return Err(ModelError::Malformed(format!("tree {} has a dangling child", t)));
                    }
                    if *count <= 0.0 {
                        return Err(ModelError::Malformed(format!(
                            "tree {} has a split without data count",
                            t
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// `pandas_categorical` level lists persisted with the model
    pub fn categorical_levels(&self) -> Option<&[Vec<String>]> {
        self.categorical_levels.as_deref()
    }

    pub fn predict_row(&self, x: &[f64]) -> f64 {
        self.trees.iter().map(|t| t.predict(x)).sum()
    }

    /// Mean model output over the training data (sum of per-tree expectations)
    pub fn expected_value(&self) -> f64 {
        self.trees.iter().map(Tree::expected_value).sum()
    }
}

impl Regressor for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if features.ncols() != self.feature_names.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.feature_names.len(),
                got: features.ncols(),
            });
        }

        Ok(features
            .rows()
            .into_iter()
            .map(|row| match row.as_slice() {
                Some(x) => self.predict_row(x),
                None => self.predict_row(&row.to_vec()),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::tree::tests::small_tree;
    use crate::logic::model::tree::{MissingType, SplitCondition};
    use ndarray::array;

    fn ensemble() -> TreeEnsemble {
        TreeEnsemble::new(
            vec!["a".into(), "b".into()],
            vec![small_tree(), Tree::constant(0.5, 100.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_predict_sums_trees() {
        let model = ensemble();
        let out = model.predict(&array![[1.0, 3.0], [2.0, 0.0]]).unwrap();
        assert_eq!(out.to_vec(), vec![40.5, 55.5]);
        assert!((model.expected_value() - 42.5).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let model = ensemble();
        let err = model.predict(&array![[1.0, 3.0, 0.0]]).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 2, got: 3 }));
    }

    #[test]
    fn test_validate_rejects_bad_feature() {
        let tree = Tree::new(vec![
            Node::Split {
                feature: 5,
                condition: SplitCondition::LessOrEqual(0.0),
                default_left: true,
                missing: MissingType::None,
                left: 1,
                right: 2,
                count: 2.0,
            },
            Node::Leaf { value: 0.0, count: 1.0 },
            Node::Leaf { value: 1.0, count: 1.0 },
        ]);
        let err = TreeEnsemble::new(vec!["a".into()], vec![tree]).unwrap_err();
        assert!(matches!(err, ModelError::Malformed(_)));
    }

    #[test]
    fn test_validate_rejects_missing_counts() {
        let tree = Tree::new(vec![
            Node::Split {
                feature: 0,
                condition: SplitCondition::LessOrEqual(0.0),
                default_left: true,
                missing: MissingType::None,
                left: 1,
                right: 2,
                count: 0.0,
            },
            Node::Leaf { value: 0.0, count: 0.0 },
            Node::Leaf { value: 1.0, count: 0.0 },
        ]);
        assert!(TreeEnsemble::new(vec!["a".into()], vec![tree]).is_err());
    }

    #[test]
    fn test_multiclass_dump_rejected() {
        let dump = ModelDump::from_json(
            r#"{"num_class": 3, "objective": "multiclass", "feature_names": ["a"], "tree_info": []}"#,
        )
        .unwrap();
        assert!(matches!(TreeEnsemble::from_dump(&dump), Err(ModelError::MultiOutput(3))));
    }

    #[test]
    fn test_unsupported_objective() {
        let dump = ModelDump::from_json(
            r#"{"objective": "binary sigmoid:1", "feature_names": ["a"], "tree_info": []}"#,
        )
        .unwrap();
        assert!(matches!(
            TreeEnsemble::from_dump(&dump),
            Err(ModelError::UnsupportedObjective(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TreeEnsemble::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }
}
