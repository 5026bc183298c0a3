//! Error types for the core library

use crate::logic::dataset::DatasetError;
use crate::logic::explain::ExplainError;
use crate::logic::features::{FeatureError, LayoutMismatchError};
use crate::logic::model::ModelError;
use crate::logic::pipeline::PipelineError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("preprocessing failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Explain(#[from] ExplainError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error("artifact `{file}` checksum mismatch: expected {expected}, got {actual}")]
    Integrity {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// The request named a hero that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Dataset(DatasetError::UnknownHero(_)))
    }

    /// The request carried input the model cannot use
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            CoreError::Pipeline(PipelineError::UnknownCategory { .. })
                | CoreError::Pipeline(PipelineError::InvalidTimestamp(_))
                | CoreError::Explain(ExplainError::ZeroCap)
        )
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
