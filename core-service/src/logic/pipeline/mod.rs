//! Pipeline Module - Preprocessing before the regressor
//!
//! Three sequential transforms, each with a `fit`/`transform` pair:
//! - `date` - timestamp → weekday + hour
//! - `class_rank` - main class → four-tier rank
//! - `category` - text columns → categorical codes

pub mod category;
pub mod class_rank;
pub mod date;

pub use category::ToCategory;
pub use class_rank::{ClassRankExtractor, ClassTier};
pub use date::DateFeaturesExtractor;

use crate::logic::features::{FeatureError, FeatureFrame};

/// Preprocessing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Frame(#[from] FeatureError),

    #[error("unknown {column} value `{value}`")]
    UnknownCategory { column: String, value: String },

    #[error("cannot parse `{0}` as a timestamp")]
    InvalidTimestamp(String),

    #[error("transform `{0}` used before fit")]
    NotFitted(&'static str),
}

/// A single preprocessing step
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    /// Learn whatever state the step needs from training data
    fn fit(&mut self, frame: &FeatureFrame) -> Result<(), PipelineError>;

    fn transform(&self, frame: FeatureFrame) -> Result<FeatureFrame, PipelineError>;
}

/// Ordered list of transforms
pub struct Pipeline {
    steps: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    pub fn new(steps: Vec<Box<dyn Transform>>) -> Self {
        Self { steps }
    }

    /// The pipeline used in front of the price model
    ///
    /// `categories` carries the level lists persisted with the model; pass
    /// `None` to learn them with [`Pipeline::fit_transform`].
    pub fn standard(categories: Option<ToCategory>) -> Self {
        Self::new(vec![
            Box::new(DateFeaturesExtractor::new()),
            Box::new(ClassRankExtractor::new()),
            Box::new(categories.unwrap_or_default()),
        ])
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Fit every step on the output of the previous one
    pub fn fit_transform(&mut self, frame: FeatureFrame) -> Result<FeatureFrame, PipelineError> {
        let mut current = frame;
        for step in self.steps.iter_mut() {
            step.fit(&current)?;
            current = step.transform(current)?;
            log::debug!("Pipeline step `{}` fitted ({} rows)", step.name(), current.len());
        }
        Ok(current)
    }

    pub fn transform(&self, frame: FeatureFrame) -> Result<FeatureFrame, PipelineError> {
        self.steps
            .iter()
            .try_fold(frame, |current, step| step.transform(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{FeatureValue, FEATURE_LAYOUT, RAW_COLUMNS};

    fn raw_frame() -> FeatureFrame {
        let mut frame = FeatureFrame::new(RAW_COLUMNS.iter().copied());
        frame
            .push_row(vec![
                2.0.into(),
                3.0.into(),
                "Wizard".into(),
                "Priest".into(),
                "INT".into(),
                "WIS".into(),
                "gardening".into(),
                6.0.into(),
                8.0.into(),
                "2022-01-24 13:05:00".into(),
            ])
            .unwrap();
        frame
            .push_row(vec![
                4.0.into(),
                1.0.into(),
                "Dragoon".into(),
                "Knight".into(),
                "STR".into(),
                "VIT".into(),
                "mining".into(),
                1.0.into(),
                5.0.into(),
                "2022-01-27 23:59:59".into(),
            ])
            .unwrap();
        frame
    }

    #[test]
    fn test_standard_steps_in_order() {
        let pipe = Pipeline::standard(None);
        assert_eq!(pipe.step_names(), vec!["date_features", "class_rank", "to_category"]);
    }

    #[test]
    fn test_fit_transform_produces_layout() {
        let mut pipe = Pipeline::standard(None);
        let out = pipe.fit_transform(raw_frame()).unwrap();

        assert_eq!(out.columns(), FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        assert_eq!(out.get(1, "classRank").and_then(|v| v.as_text()), Some("Elite"));
        assert_eq!(out.get(1, "buyHour"), Some(&FeatureValue::Number(23.0)));

        // Fitted pipeline reuses learned levels
        let again = pipe.transform(raw_frame()).unwrap();
        assert_eq!(again, out);

        let matrix = out.to_matrix(FEATURE_LAYOUT).unwrap();
        assert_eq!(matrix.shape(), &[2, FEATURE_LAYOUT.len()]);
    }

    #[test]
    fn test_unfitted_category_step_fails() {
        let pipe = Pipeline::standard(None);
        let err = pipe.transform(raw_frame()).unwrap_err();
        assert!(matches!(err, PipelineError::NotFitted("to_category")));
    }
}
