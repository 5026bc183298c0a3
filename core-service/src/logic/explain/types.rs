use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::ExplainError;

/// Direction a feature pushes the price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    /// Feature value as displayed
    pub value: String,
    /// Signed SHAP value in model output units (JEWEL)
    pub attribution: f64,
    pub direction: Direction,
}

/// Raw explainer output for a batch: rows × features values plus one base
/// value per model output
#[derive(Debug, Clone, PartialEq)]
pub struct ShapValues {
    pub values: Array2<f64>,
    pub base_values: Array1<f64>,
}

/// Explanation of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub base_value: f64,
    pub values: Vec<f64>,
    pub feature_names: Vec<String>,
    /// Displayed feature values, same order as `values`
    pub data: Vec<String>,
}

impl Explanation {
    pub fn new(
        base_value: f64,
        values: Vec<f64>,
        feature_names: Vec<String>,
        data: Vec<String>,
    ) -> Result<Self, ExplainError> {
        if values.len() != feature_names.len() || values.len() != data.len() {
            return Err(ExplainError::LengthMismatch {
                values: values.len(),
                names: feature_names.len(),
                data: data.len(),
            });
        }
        Ok(Self {
            base_value,
            values,
            feature_names,
            data,
        })
    }

    /// Pick the single explanation out of a batch
    ///
    /// Fails on a matrix of several explanations and on a base value per
    /// output (multi-output model); neither can be drawn as one waterfall.
    pub fn from_shap(
        shap: &ShapValues,
        feature_names: Vec<String>,
        data: Vec<String>,
    ) -> Result<Self, ExplainError> {
        if shap.base_values.len() != 1 {
            return Err(ExplainError::NonScalarBaseline(shap.base_values.len()));
        }
        if shap.values.nrows() != 1 {
            return Err(ExplainError::MultipleExplanations(shap.values.nrows()));
        }
        Self::new(shap.base_values[0], shap.values.row(0).to_vec(), feature_names, data)
    }

    /// Model output: baseline plus every attribution
    pub fn prediction(&self) -> f64 {
        self.base_value + self.values.iter().sum::<f64>()
    }

    /// Indices sorted by descending |attribution|, ties in input order
    pub fn order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[b].abs().total_cmp(&self.values[a].abs()));
        order
    }

    pub fn contributions(&self) -> Vec<FeatureContribution> {
        self.order()
            .into_iter()
            .map(|i| FeatureContribution {
                name: self.feature_names[i].clone(),
                value: self.data[i].clone(),
                attribution: self.values[i],
                direction: Direction::of(self.values[i]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_from_shap_single_row() {
        let shap = ShapValues {
            values: array![[5.0, -2.0, 1.0, -0.3]],
            base_values: array![10.0],
        };
        let exp = Explanation::from_shap(&shap, names(4), names(4)).unwrap();
        assert!((exp.prediction() - 13.7).abs() < 1e-12);
        assert_eq!(exp.order(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_from_shap_rejects_matrix() {
        let shap = ShapValues {
            values: array![[1.0, 2.0], [3.0, 4.0]],
            base_values: array![0.0],
        };
        let err = Explanation::from_shap(&shap, names(2), names(2)).unwrap_err();
        assert!(matches!(err, ExplainError::MultipleExplanations(2)));
    }

    #[test]
    fn test_from_shap_rejects_vector_baseline() {
        let shap = ShapValues {
            values: array![[1.0, 2.0]],
            base_values: array![0.0, 1.0],
        };
        let err = Explanation::from_shap(&shap, names(2), names(2)).unwrap_err();
        assert!(matches!(err, ExplainError::NonScalarBaseline(2)));
    }

    #[test]
    fn test_length_mismatch() {
        let err = Explanation::new(0.0, vec![1.0], names(2), names(1)).unwrap_err();
        assert!(matches!(err, ExplainError::LengthMismatch { values: 1, names: 2, data: 1 }));
    }

    #[test]
    fn test_order_is_stable_on_ties() {
        let exp = Explanation::new(0.0, vec![1.0, -3.0, -1.0, 3.0], names(4), names(4)).unwrap();
        assert_eq!(exp.order(), vec![1, 3, 0, 2]);

        let contributions = exp.contributions();
        assert_eq!(contributions[0].direction, Direction::Down);
        assert_eq!(contributions[1].direction, Direction::Up);
    }
}
