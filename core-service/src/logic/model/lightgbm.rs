//! LightGBM `dump_model()` JSON format
//!
//! Only what prediction and TreeSHAP need is read; unknown keys are ignored.

use serde::Deserialize;
use serde_json::Value;

use super::tree::{MissingType, Node, SplitCondition, Tree};
use super::ModelError;

#[derive(Debug, Clone, Deserialize)]
pub struct ModelDump {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default = "default_num_class")]
    pub num_class: usize,
    #[serde(default = "default_num_class")]
    pub num_tree_per_iteration: usize,
    #[serde(default)]
    pub objective: String,
    pub feature_names: Vec<String>,
    pub tree_info: Vec<TreeInfo>,
    /// Level lists of the categorical columns, in column order
    #[serde(default)]
    pub pandas_categorical: Option<Vec<Vec<Value>>>,
}

fn default_num_class() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeInfo {
    pub tree_index: usize,
    #[serde(default)]
    pub num_leaves: usize,
    #[serde(default = "default_shrinkage")]
    pub shrinkage: f64,
    pub tree_structure: DumpNode,
}

fn default_shrinkage() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DumpNode {
    Split {
        split_feature: usize,
        threshold: Threshold,
        decision_type: String,
        #[serde(default)]
        default_left: bool,
        #[serde(default = "default_missing_type")]
        missing_type: String,
        #[serde(default)]
        internal_count: f64,
        left_child: Box<DumpNode>,
        right_child: Box<DumpNode>,
    },
    Leaf {
        leaf_value: f64,
        #[serde(default)]
        leaf_count: f64,
    },
}

fn default_missing_type() -> String {
    "None".to_string()
}

fn parse_missing(text: &str) -> Result<MissingType, ModelError> {
    match text {
        "None" => Ok(MissingType::None),
        "Zero" => Ok(MissingType::Zero),
        "NaN" => Ok(MissingType::NaN),
        other => Err(ModelError::Malformed(format!("unknown missing_type `{}`", other))),
    }
}

fn parse_condition(decision_type: &str, threshold: &Threshold) -> Result<SplitCondition, ModelError> {
    match (decision_type, threshold) {
        ("<=", Threshold::Number(t)) => Ok(SplitCondition::LessOrEqual(*t)),
        ("<=", Threshold::Text(t)) => t
            .trim()
            .parse::<f64>()
            .map(SplitCondition::LessOrEqual)
            .map_err(|_| ModelError::Malformed(format!("bad numerical threshold `{}`", t))),
        ("==", Threshold::Text(t)) => t
            .split("||")
            .map(|code| code.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map(SplitCondition::InSet)
            .map_err(|_| ModelError::Malformed(format!("bad categorical threshold `{}`", t))),
        ("==", Threshold::Number(t)) if *t >= 0.0 && t.fract() == 0.0 => {
            Ok(SplitCondition::InSet(vec![*t as u32]))
        }
        (other, _) => Err(ModelError::Malformed(format!("unsupported decision_type `{}`", other))),
    }
}

/// Flatten a nested dump node into the arena, pre-order
fn flatten(node: &DumpNode, nodes: &mut Vec<Node>) -> Result<usize, ModelError> {
    let index = nodes.len();
    match node {
        DumpNode::Leaf { leaf_value, leaf_count } => {
            nodes.push(Node::Leaf {
                value: *leaf_value,
                count: *leaf_count,
            });
        }
        DumpNode::Split {
            split_feature,
            threshold,
            decision_type,
            default_left,
            missing_type,
            internal_count,
            left_child,
            right_child,
        } => {
            // Placeholder until the children have indices
            nodes.push(Node::Leaf { value: 0.0, count: 0.0 });
            let left = flatten(left_child, nodes)?;
            let right = flatten(right_child, nodes)?;
            nodes[index] = Node::Split {
                feature: *split_feature,
                condition: parse_condition(decision_type, threshold)?,
                default_left: *default_left,
                missing: parse_missing(missing_type)?,
                left,
                right,
                count: *internal_count,
            };
        }
    }
    Ok(index)
}

impl TreeInfo {
    pub fn to_tree(&self) -> Result<Tree, ModelError> {
        let mut nodes = Vec::with_capacity(self.num_leaves.max(1) * 2);
        flatten(&self.tree_structure, &mut nodes)?;
        Ok(Tree::new(nodes))
    }
}

impl ModelDump {
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Categorical level lists as strings
    pub fn categorical_levels(&self) -> Option<Vec<Vec<String>>> {
        self.pandas_categorical.as_ref().map(|columns| {
            columns
                .iter()
                .map(|levels| {
                    levels
                        .iter()
                        .map(|v| match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect()
                })
                .collect()
        })
    }
}
