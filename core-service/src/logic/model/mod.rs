//! Model Module - Gradient-boosted tree inference
//!
//! Loads a LightGBM model dump and predicts prices. Kept apart from the
//! explainer so the regressor can be swapped without touching attribution.

pub mod inference;
pub mod lightgbm;
pub mod tree;

// Re-export common types
pub use inference::{ModelMetadata, Regressor, TreeEnsemble};
pub use lightgbm::ModelDump;
pub use tree::{MissingType, Node, SplitCondition, Tree};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model file not found: {0}")]
    NotFound(String),

    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed model: {0}")]
    Malformed(String),

    #[error("unsupported objective `{0}`")]
    UnsupportedObjective(String),

    #[error("model has {0} outputs, only single-output regression is supported")]
    MultiOutput(usize),

    #[error("expected {expected} feature columns, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
}
