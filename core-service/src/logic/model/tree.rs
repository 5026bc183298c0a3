//! Regression tree stored as a flat node arena
//!
//! Node 0 is the root. Every node keeps the number of training rows that
//! reached it (`count`), which both the expected value and TreeSHAP need.

use serde::{Deserialize, Serialize};

/// How a split treats missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingType {
    /// NaN is treated as 0.0
    None,
    /// 0.0 (and NaN) follows the default direction
    Zero,
    /// NaN follows the default direction
    NaN,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SplitCondition {
    /// Numerical split, left when `x <= threshold`
    LessOrEqual(f64),
    /// Categorical split, left when the category code is in the set
    InSet(Vec<u32>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature: usize,
        condition: SplitCondition,
        default_left: bool,
        missing: MissingType,
        left: usize,
        right: usize,
        count: f64,
    },
    Leaf {
        value: f64,
        count: f64,
    },
}

impl Node {
    pub fn count(&self) -> f64 {
        match self {
            Node::Split { count, .. } | Node::Leaf { count, .. } => *count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Single-leaf tree (constant output)
    pub fn constant(value: f64, count: f64) -> Self {
        Self::new(vec![Node::Leaf { value, count }])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child taken by `x` at split node `index`
    ///
    /// Returns `index` itself for a leaf.
    pub fn decision(&self, index: usize, x: &[f64]) -> usize {
        match &self.nodes[index] {
            Node::Leaf { .. } => index,
            Node::Split {
                feature,
                condition,
                default_left,
                missing,
                left,
                right,
                ..
            } => {
                let raw = x.get(*feature).copied().unwrap_or(f64::NAN);
                let default_child = if *default_left { *left } else { *right };

                match condition {
                    SplitCondition::LessOrEqual(threshold) => {
                        let value = if raw.is_nan() && *missing != MissingType::NaN { 0.0 } else { raw };
                        let use_default = match missing {
                            MissingType::Zero => value == 0.0,
                            MissingType::NaN => value.is_nan(),
                            MissingType::None => false,
                        };
                        if use_default {
                            default_child
                        } else if value <= *threshold {
                            *left
                        } else {
                            *right
                        }
                    }
                    SplitCondition::InSet(codes) => {
                        if raw.is_nan() || raw < 0.0 {
                            return *right;
                        }
                        if codes.contains(&(raw as u32)) {
                            *left
                        } else {
                            *right
                        }
                    }
                }
            }
        }
    }

    /// Leaf index reached by `x`
    pub fn leaf_index(&self, x: &[f64]) -> usize {
        let mut index = 0;
        loop {
            let next = self.decision(index, x);
            if next == index {
                return index;
            }
            index = next;
        }
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        match &self.nodes[self.leaf_index(x)] {
            Node::Leaf { value, .. } => *value,
            Node::Split { .. } => unreachable!("leaf_index always stops on a leaf"),
        }
    }

    /// Count-weighted mean of the leaf values
    ///
    /// A single-leaf tree always yields its leaf value; LightGBM dumps
    /// such trees without a `leaf_count`.
    pub fn expected_value(&self) -> f64 {
        if let Some(Node::Leaf { value, .. }) = self.nodes.first() {
            return *value;
        }
        let total = self.nodes.first().map(Node::count).unwrap_or(0.0);
        if total <= 0.0 {
            return 0.0;
        }
        let weighted: f64 = self
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Leaf { value, count } => Some(value * count),
                Node::Split { .. } => None,
            })
            .sum();
        weighted / total
    }

    /// Deepest root-to-leaf path length in edges
    pub fn max_depth(&self) -> usize {
        fn depth(tree: &Tree, index: usize) -> usize {
            match tree.node(index) {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth(tree, *left).max(depth(tree, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            depth(self, 0)
        }
    }
}
