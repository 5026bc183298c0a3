//! Features Module - Feature Extraction Engine
//!
//! Turns a raw hero record into the column layout the model was trained on.
//! The layout is versioned and hashed so a model trained on another schema
//! is rejected at load time.

pub mod frame;
pub mod hero;
pub mod layout;


// Re-export common types
pub use frame::{FeatureFrame, FeatureValue};
pub use hero::{hero_to_display, remaining_summons, HeroRecord};
pub use layout::{
    feature_index, feature_name, validate_feature_names, LayoutInfo, LayoutMismatchError,
    CATEGORICAL_FEATURES, FEATURE_COUNT, FEATURE_LAYOUT, RAW_COLUMNS,
};

/// Frame shape and value errors
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("missing column `{0}`")]
    MissingColumn(String),

    #[error("row has {got} values, expected {expected}")]
    RowLength { expected: usize, got: usize },

    #[error("column `{column}` holds non-numeric value `{value}`")]
    NotNumeric { column: String, value: String },
}
