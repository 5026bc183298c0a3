//! Tree explainer - path-dependent TreeSHAP
//!
//! Exact Shapley values of the count-weighted conditional expectation of a
//! tree ensemble, in polynomial time (Lundberg et al., "Consistent
//! Individualized Feature Attribution for Tree Ensembles", algorithm 2).
//!
//! For every row: `expected_value + Σ phi == prediction`.

use std::sync::Arc;

use ndarray::{Array1, Array2};

use super::types::ShapValues;
use crate::logic::model::{ModelError, Node, Regressor, Tree, TreeEnsemble};

#[derive(Debug, Clone, Copy, Default)]
struct PathElement {
    /// `None` for the synthetic root element
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

fn extend_path(path: &mut [PathElement], unique_depth: usize, zero: f64, one: f64, feature: Option<usize>) {
    path[unique_depth] = PathElement {
        feature,
        zero_fraction: zero,
        one_fraction: one,
        pweight: if unique_depth == 0 { 1.0 } else { 0.0 },
    };

    let depth_plus_one = (unique_depth + 1) as f64;
    for i in (0..unique_depth).rev() {
        path[i + 1].pweight += one * path[i].pweight * (i + 1) as f64 / depth_plus_one;
        path[i].pweight = zero * path[i].pweight * (unique_depth - i) as f64 / depth_plus_one;
    }
}

fn unwind_path(path: &mut [PathElement], unique_depth: usize, path_index: usize) {
    let one = path[path_index].one_fraction;
    let zero = path[path_index].zero_fraction;
    let depth_plus_one = (unique_depth + 1) as f64;
    let mut next_one_portion = path[unique_depth].pweight;

    for i in (0..unique_depth).rev() {
        if one != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * depth_plus_one / ((i + 1) as f64 * one);
            next_one_portion = tmp - path[i].pweight * zero * (unique_depth - i) as f64 / depth_plus_one;
        } else {
            path[i].pweight = path[i].pweight * depth_plus_one / (zero * (unique_depth - i) as f64);
        }
    }

    for i in path_index..unique_depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

/// Total permutation weight of the path with element `path_index` removed
fn unwound_path_sum(path: &[PathElement], unique_depth: usize, path_index: usize) -> f64 {
    let one = path[path_index].one_fraction;
    let zero = path[path_index].zero_fraction;
    let depth_plus_one = (unique_depth + 1) as f64;
    let mut next_one_portion = path[unique_depth].pweight;
    let mut total = 0.0;

    for i in (0..unique_depth).rev() {
        if one != 0.0 {
            let tmp = next_one_portion * depth_plus_one / ((i + 1) as f64 * one);
            total += tmp;
            next_one_portion = path[i].pweight - tmp * zero * ((unique_depth - i) as f64 / depth_plus_one);
        } else if zero != 0.0 {
            total += (path[i].pweight / zero) / ((unique_depth - i) as f64 / depth_plus_one);
        }
    }
    total
}

#[allow(clippy::too_many_arguments)]
fn tree_shap(
    tree: &Tree,
    x: &[f64],
    phi: &mut [f64],
    node: usize,
    parent_path: &[PathElement],
    mut unique_depth: usize,
    parent_zero: f64,
    parent_one: f64,
    parent_feature: Option<usize>,
) {
    let mut path = Vec::with_capacity(unique_depth + 2);
    path.extend_from_slice(&parent_path[..unique_depth]);
    path.push(PathElement::default());
    extend_path(&mut path, unique_depth, parent_zero, parent_one, parent_feature);

    match tree.node(node) {
        Node::Leaf { value, .. } => {
            for i in 1..=unique_depth {
                let w = unwound_path_sum(&path, unique_depth, i);
                let el = path[i];
                if let Some(feature) = el.feature {
                    phi[feature] += w * (el.one_fraction - el.zero_fraction) * value;
                }
            }
        }
        Node::Split {
            feature,
            left,
            right,
            count,
            ..
        } => {
            let hot = tree.decision(node, x);
            let cold = if hot == *left { *right } else { *left };
            let hot_zero = tree.node(hot).count() / count;
            let cold_zero = tree.node(cold).count() / count;

            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;

            // Undo an earlier split on the same feature so it is counted once
            if let Some(k) = (0..=unique_depth).find(|&k| path[k].feature == Some(*feature)) {
                incoming_zero = path[k].zero_fraction;
                incoming_one = path[k].one_fraction;
                unwind_path(&mut path, unique_depth, k);
                unique_depth -= 1;
            }

            tree_shap(
                tree,
                x,
                phi,
                hot,
                &path,
                unique_depth + 1,
                hot_zero * incoming_zero,
                incoming_one,
                Some(*feature),
            );
            tree_shap(
                tree,
                x,
                phi,
                cold,
                &path,
                unique_depth + 1,
                cold_zero * incoming_zero,
                0.0,
                Some(*feature),
            );
        }
    }
}

/// SHAP values of one tree for one row, accumulated into `phi`
pub fn tree_contributions(tree: &Tree, x: &[f64], phi: &mut [f64]) {
    if tree.is_empty() {
        return;
    }
    tree_shap(tree, x, phi, 0, &[], 0, 1.0, 1.0, None);
}

/// Explainer bound to a loaded ensemble
#[derive(Debug, Clone)]
pub struct TreeExplainer {
    model: Arc<TreeEnsemble>,
    expected_value: f64,
}

impl TreeExplainer {
    pub fn new(model: Arc<TreeEnsemble>) -> Self {
        let expected_value = model.expected_value();
        log::debug!("Tree explainer ready, expected value {:.4}", expected_value);
        Self { model, expected_value }
    }

    pub fn model(&self) -> &TreeEnsemble {
        &self.model
    }

    /// Baseline: mean model output over the training data
    pub fn expected_value(&self) -> f64 {
        self.expected_value
    }

    pub fn explain_row(&self, x: &[f64]) -> Vec<f64> {
        let mut phi = vec![0.0; self.model.feature_names().len()];
        for tree in self.model.trees() {
            tree_contributions(tree, x, &mut phi);
        }
        phi
    }

    /// Rows × features SHAP matrix
    pub fn shap_values(&self, features: &Array2<f64>) -> Result<ShapValues, ModelError> {
        let n_features = self.model.feature_names().len();
        if features.ncols() != n_features {
            return Err(ModelError::ShapeMismatch {
                expected: n_features,
                got: features.ncols(),
            });
        }

        let mut values = Array2::<f64>::zeros((features.nrows(), n_features));
        for (r, row) in features.rows().into_iter().enumerate() {
            let x = row.to_vec();
            let phi = self.explain_row(&x);
            for (c, v) in phi.into_iter().enumerate() {
                values[[r, c]] = v;
            }
        }

        Ok(ShapValues {
            values,
            base_values: Array1::from_elem(1, self.expected_value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::tree::tests::small_tree;
    use crate::logic::model::{MissingType, ModelDump, SplitCondition};
    use ndarray::array;
    use proptest::prelude::*;

    /// Splits on feature 0 twice along one path:
    /// x0 <= 1 ? (x1 <= 0.5 ? (x0 <= 0 ? 10 : 20) : 5) : (x2 <= 2 ? -4 : 8)
    fn repeated_feature_tree() -> Tree {
        let split = |feature, threshold, left, right, count| Node::Split {
            feature,
            condition: SplitCondition::LessOrEqual(threshold),
            default_left: true,
            missing: MissingType::None,
            left,
            right,
            count,
        };
        Tree::new(vec![
            split(0, 1.0, 1, 6, 100.0),
            split(1, 0.5, 2, 5, 60.0),
            split(0, 0.0, 3, 4, 45.0),
            Node::Leaf { value: 10.0, count: 15.0 },
            Node::Leaf { value: 20.0, count: 30.0 },
            Node::Leaf { value: 5.0, count: 15.0 },
            split(2, 2.0, 7, 8, 40.0),
            Node::Leaf { value: -4.0, count: 10.0 },
            Node::Leaf { value: 8.0, count: 30.0 },
        ])
    }

    /// E[f(x) | x_S] with unknown features integrated out by data counts
    fn conditional_expectation(tree: &Tree, node: usize, x: &[f64], known: &[bool]) -> f64 {
        match tree.node(node) {
            Node::Leaf { value, .. } => *value,
            Node::Split { feature, left, right, count, .. } => {
                if known[*feature] {
                    conditional_expectation(tree, tree.decision(node, x), x, known)
                } else {
                    (tree.node(*left).count() * conditional_expectation(tree, *left, x, known)
                        + tree.node(*right).count() * conditional_expectation(tree, *right, x, known))
                        / count
                }
            }
        }
    }

    fn factorial(n: usize) -> f64 {
        (1..=n).map(|k| k as f64).product()
    }

    /// Shapley values by enumerating every coalition
    fn brute_force_shap(tree: &Tree, x: &[f64], m: usize) -> Vec<f64> {
        let mut phi = vec![0.0; m];
        for i in 0..m {
            for mask in 0u32..(1 << m) {
                if mask & (1 << i) != 0 {
                    continue;
                }
                let size = mask.count_ones() as usize;
                let weight = factorial(size) * factorial(m - size - 1) / factorial(m);

                let mut known: Vec<bool> = (0..m).map(|j| mask & (1 << j) != 0).collect();
                let without = conditional_expectation(tree, 0, x, &known);
                known[i] = true;
                let with = conditional_expectation(tree, 0, x, &known);
                phi[i] += weight * (with - without);
            }
        }
        phi
    }

    fn assert_close(a: &[f64], b: &[f64]) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_matches_brute_force_small_tree() {
        let tree = small_tree();
        for x in [[1.0, 3.0], [1.0, 2.0], [2.0, 3.0], [0.0, f64::NAN]] {
            let mut phi = vec![0.0; 2];
            tree_contributions(&tree, &x, &mut phi);
            assert_close(&phi, &brute_force_shap(&tree, &x, 2));
        }
    }

    #[test]
    fn test_matches_brute_force_repeated_feature() {
        let tree = repeated_feature_tree();
        for x in [
            [-1.0, 0.0, 0.0],
            [0.5, 0.0, 3.0],
            [0.5, 1.0, 3.0],
            [2.0, 0.0, 1.0],
            [2.0, 1.0, 5.0],
        ] {
            let mut phi = vec![0.0; 3];
            tree_contributions(&tree, &x, &mut phi);
            assert_close(&phi, &brute_force_shap(&tree, &x, 3));
        }
    }

    #[test]
    fn test_unused_feature_gets_zero() {
        let tree = small_tree();
        let mut phi = vec![0.0; 3];
        tree_contributions(&tree, &[1.0, 3.0, 99.0], &mut phi);
        assert_eq!(phi[2], 0.0);
    }

    #[test]
    fn test_shap_values_shape_and_base() {
        let model = TreeEnsemble::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![repeated_feature_tree(), Tree::constant(1.5, 100.0)],
        )
        .unwrap();
        let explainer = TreeExplainer::new(Arc::new(model));

        let shap = explainer.shap_values(&array![[0.5, 0.0, 3.0], [2.0, 1.0, 1.0]]).unwrap();
        assert_eq!(shap.values.shape(), &[2, 3]);
        assert_eq!(shap.base_values.len(), 1);

        let err = explainer.shap_values(&array![[0.5, 0.0]]).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 3, got: 2 }));
    }

    #[test]
    fn test_countless_leaf_tree_keeps_additivity() {
        let dump = ModelDump::from_json(
            r#"{
                "num_class": 1, "num_tree_per_iteration": 1, "objective": "regression",
                "feature_names": ["a"],
                "tree_info": [
                    {"tree_index": 0, "num_leaves": 2, "tree_structure": {
                        "split_feature": 0, "threshold": 0.5, "decision_type": "<=",
                        "internal_count": 10,
                        "left_child": {"leaf_value": 1.0, "leaf_count": 5},
                        "right_child": {"leaf_value": 3.0, "leaf_count": 5}
                    }},
                    {"tree_index": 1, "num_leaves": 1, "tree_structure": {"leaf_value": 0.5}}
                ]
            }"#,
        )
        .unwrap();
        let explainer = TreeExplainer::new(Arc::new(TreeEnsemble::from_dump(&dump).unwrap()));
        assert!((explainer.expected_value() - 2.5).abs() < 1e-9);

        let x = [0.0];
        let phi = explainer.explain_row(&x);
        let total = explainer.expected_value() + phi.iter().sum::<f64>();
        assert!((total - explainer.model().predict_row(&x)).abs() < 1e-9);
        assert!((total - 1.5).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn additive_identity(x0 in -2.0f64..3.0, x1 in -1.0f64..2.0, x2 in 0.0f64..4.0) {
            let model = TreeEnsemble::new(
                vec!["a".into(), "b".into(), "c".into()],
                vec![repeated_feature_tree(), small_tree(), Tree::constant(-0.25, 100.0)],
            )
            .unwrap();
            let explainer = TreeExplainer::new(Arc::new(model));
            let x = [x0, x1, x2];

            let phi = explainer.explain_row(&x);
            let total = explainer.expected_value() + phi.iter().sum::<f64>();
            let predicted = explainer.model().predict_row(&x);
            prop_assert!((total - predicted).abs() < 1e-9, "{} != {}", total, predicted);
        }
    }
}
