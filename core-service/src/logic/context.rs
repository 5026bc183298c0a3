//! Prediction Context - everything a request needs, loaded once
//!
//! Built at startup from the artifact directory, then shared read-only
//! (`Arc<PredictionContext>`) by every request. Nothing in here mutates
//! after construction.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::constants::{
    CROSS_VALIDATION_FILE, FAVICON_FILE, HEROES_FILE, MODEL_FILE, PRICE_IMPACT_FILE, TAVERN_FILE,
};
use crate::error::CoreResult;
use crate::logic::artifacts::verify_artifacts;
use crate::logic::dataset::analytics::{load_cross_validation, load_price_impact};
use crate::logic::dataset::{tavern, CrossValidationRow, DatasetSummary, HeroSource, PriceImpact, SnapshotSource};
use crate::logic::explain::text::encode_png;
use crate::logic::explain::{
    render_svg, shap_to_text, Explanation, FeatureContribution, SvgOptions, TreeExplainer, WaterfallLayout,
};
use crate::logic::features::{
    hero_to_display, validate_feature_names, FeatureFrame, CATEGORICAL_FEATURES, FEATURE_LAYOUT,
};
use crate::logic::model::{ModelError, Regressor, TreeEnsemble};
use crate::logic::pipeline::{Pipeline, ToCategory};

/// One explained prediction
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub hero_id: u64,
    /// JEWEL
    pub price: f64,
    pub base_value: f64,
    /// Human-readable feature values
    pub features: Value,
    /// Strongest first
    pub contributions: Vec<FeatureContribution>,
    #[serde(skip)]
    pub explanation: Explanation,
}

pub struct PredictionContext {
    model: Arc<TreeEnsemble>,
    explainer: TreeExplainer,
    pipeline: Pipeline,
    heroes: Box<dyn HeroSource>,
    cross_validation: Vec<CrossValidationRow>,
    price_impact: Vec<PriceImpact>,
    tavern_summary: Option<DatasetSummary>,
    jewel_png: Option<String>,
}

/// Map `pandas_categorical` lists onto the categorical columns, in order
fn categories_from_model(model: &TreeEnsemble) -> CoreResult<Option<ToCategory>> {
    let Some(levels) = model.categorical_levels() else {
        return Ok(None);
    };
    if levels.len() != CATEGORICAL_FEATURES.len() {
        return Err(ModelError::Malformed(format!(
            "model carries {} categorical level lists, expected {}",
            levels.len(),
            CATEGORICAL_FEATURES.len()
        ))
        .into());
    }
    let columns = CATEGORICAL_FEATURES
        .iter()
        .zip(levels)
        .map(|(name, levels)| (name.to_string(), levels.clone()))
        .collect();
    Ok(Some(ToCategory::from_levels(columns)))
}

impl PredictionContext {
    /// Assemble a context from a loaded model and a hero source
    ///
    /// Categorical levels come from the model; when it carries none they are
    /// fitted on `training` (raw tavern features).
    pub fn from_parts(
        model: TreeEnsemble,
        heroes: Box<dyn HeroSource>,
        training: Option<FeatureFrame>,
    ) -> CoreResult<Self> {
        validate_feature_names(model.feature_names())?;

        let pipeline = match (categories_from_model(&model)?, training) {
            (Some(categories), _) => Pipeline::standard(Some(categories)),
            (None, Some(frame)) => {
                let mut pipeline = Pipeline::standard(None);
                pipeline.fit_transform(frame)?;
                log::info!("Categorical levels fitted on training data");
                pipeline
            }
            (None, None) => {
                return Err(ModelError::Malformed(
                    "model has no categorical levels and no training data was given".to_string(),
                )
                .into())
            }
        };

        let model = Arc::new(model);
        Ok(Self {
            explainer: TreeExplainer::new(Arc::clone(&model)),
            model,
            pipeline,
            heroes,
            cross_validation: Vec::new(),
            price_impact: Vec::new(),
            tavern_summary: None,
            jewel_png: None,
        })
    }

    /// Load every artifact of `dir`
    pub fn load(dir: &Path) -> CoreResult<Self> {
        log::info!("Loading artifacts from {}", dir.display());
        verify_artifacts(dir)?;

        let model = TreeEnsemble::load(&dir.join(MODEL_FILE))?;
        let heroes = SnapshotSource::load(&dir.join(HEROES_FILE))?;

        let tavern_path = dir.join(TAVERN_FILE);
        let tavern = if tavern_path.exists() {
            Some(tavern::remove_outlier(tavern::load(&tavern_path)?))
        } else {
            None
        };
        let (training, summary) = match &tavern {
            Some(sales) => (Some(tavern::to_x_y(sales)?.0), Some(DatasetSummary::of(sales)?)),
            None => (None, None),
        };

        let favicon_path = dir.join(FAVICON_FILE);
        let jewel_png = if favicon_path.exists() {
            Some(encode_png(&std::fs::read(&favicon_path)?))
        } else {
            None
        };

        let context = Self::from_parts(model, Box::new(heroes), training)?
            .with_analytics(
                load_cross_validation(&dir.join(CROSS_VALIDATION_FILE))?,
                load_price_impact(&dir.join(PRICE_IMPACT_FILE))?,
            )
            .with_tavern_summary(summary)
            .with_jewel_png(jewel_png);

        log::info!(
            "Prediction context ready: {} heroes, average price {:.2} JEWEL",
            context.heroes.len(),
            context.average_price()
        );
        Ok(context)
    }

    pub fn with_analytics(mut self, cross_validation: Vec<CrossValidationRow>, price_impact: Vec<PriceImpact>) -> Self {
        self.cross_validation = cross_validation;
        self.price_impact = price_impact;
        self
    }

    pub fn with_tavern_summary(mut self, summary: Option<DatasetSummary>) -> Self {
        self.tavern_summary = summary;
        self
    }

    pub fn with_jewel_png(mut self, jewel_png: Option<String>) -> Self {
        self.jewel_png = jewel_png;
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn model(&self) -> &TreeEnsemble {
        &self.model
    }

    pub fn heroes(&self) -> &dyn HeroSource {
        self.heroes.as_ref()
    }

    /// Model baseline, the price of an "average" hero
    pub fn average_price(&self) -> f64 {
        self.explainer.expected_value()
    }

    pub fn cross_validation(&self) -> &[CrossValidationRow] {
        &self.cross_validation
    }

    pub fn price_impact(&self) -> &[PriceImpact] {
        &self.price_impact
    }

    pub fn tavern_summary(&self) -> Option<&DatasetSummary> {
        self.tavern_summary.as_ref()
    }

    pub fn jewel_png(&self) -> Option<&str> {
        self.jewel_png.as_deref()
    }

    // ========================================================================
    // PREDICTION
    // ========================================================================

    pub fn predict(&self, hero_id: u64) -> CoreResult<Prediction> {
        self.predict_at(hero_id, Utc::now())
    }

    /// Predict and explain the price of a hero listed at `now`
    pub fn predict_at(&self, hero_id: u64, now: DateTime<Utc>) -> CoreResult<Prediction> {
        let hero = self.heroes.hero(hero_id)?;
        let features = self.pipeline.transform(hero.to_frame(now)?)?;
        let matrix = features.to_matrix(FEATURE_LAYOUT)?;

        let price = self.model.predict(&matrix)?[0];
        let shap = self.explainer.shap_values(&matrix)?;

        let data = features
            .row(0)
            .map(|row| row.iter().map(|v| v.display()).collect())
            .unwrap_or_default();
        let explanation = Explanation::from_shap(
            &shap,
            FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            data,
        )?;

        let drift = (explanation.prediction() - price).abs();
        if drift > 1e-6 {
            log::warn!("Hero {}: attributions miss the prediction by {:.2e}", hero_id, drift);
        }
        log::debug!("Hero {} predicted at {:.3} JEWEL", hero_id, price);

        Ok(Prediction {
            hero_id,
            price,
            base_value: explanation.base_value,
            features: hero_to_display(&features),
            contributions: explanation.contributions(),
            explanation,
        })
    }

    pub fn waterfall(&self, prediction: &Prediction, max_display: usize) -> CoreResult<WaterfallLayout> {
        Ok(WaterfallLayout::new(&prediction.explanation, max_display)?)
    }

    pub fn waterfall_svg(&self, prediction: &Prediction, max_display: usize, width: u32) -> CoreResult<String> {
        let layout = self.waterfall(prediction, max_display)?;
        let options = SvgOptions {
            width,
            logo_png: self.jewel_png.clone(),
            ..SvgOptions::default()
        };
        Ok(render_svg(&layout, &options))
    }

    pub fn explanation_text(&self, prediction: &Prediction, max_items: usize) -> String {
        shap_to_text(&prediction.explanation, self.average_price(), self.jewel_png(), max_items)
    }
}

impl std::fmt::Debug for PredictionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionContext")
            .field("model", self.model.metadata())
            .field("pipeline", &self.pipeline.step_names())
            .field("heroes", &self.heroes.len())
            .field("cross_validation", &self.cross_validation.len())
            .field("price_impact", &self.price_impact.len())
            .finish()
    }
}

