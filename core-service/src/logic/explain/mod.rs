//! Explain Module - SHAP attribution and its renderings
//!
//! TreeSHAP over the loaded ensemble, the waterfall layout of one
//! explanation, its SVG drawing and the HTML text summary.

/// Append one formatted line to a `String` buffer
macro_rules! push_line {
    ($out:expr, $($arg:tt)*) => {{
        $out.push_str(&format!($($arg)*));
        $out.push('\n');
    }};
}

pub mod engine;
pub mod svg;
pub mod text;
pub mod types;
pub mod waterfall;

// Re-export common types
pub use engine::TreeExplainer;
pub use svg::{render_svg, SvgOptions};
pub use text::{escape_markup, shap_to_text};
pub use types::{Direction, Explanation, FeatureContribution, ShapValues};
pub use waterfall::{
    format_value, Bar, Connector, LabelPlacement, RowLabel, WaterfallLayout, NEGATIVE_COLOUR,
    POSITIVE_COLOUR,
};

#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    #[error("waterfall needs a scalar base value, got {0} base values (multi-output model?)")]
    NonScalarBaseline(usize),

    #[error("waterfall can only plot a single explanation, got a matrix of {0} rows")]
    MultipleExplanations(usize),

    #[error("{values} attribution values for {names} feature names and {data} feature values")]
    LengthMismatch { values: usize, names: usize, data: usize },

    #[error("max_display must be at least 1")]
    ZeroCap,
}
