//! Categorical coercion: text columns → category codes
//!
//! Codes are positions in the level list of each column. Fitted levels are
//! sorted; levels loaded from a model artifact keep their persisted order.

use super::{PipelineError, Transform};
use crate::logic::features::{FeatureFrame, FeatureValue};

/// Column name with its ordered levels
pub type ColumnLevels = (String, Vec<String>);

#[derive(Debug, Default, Clone)]
pub struct ToCategory {
    levels: Option<Vec<ColumnLevels>>,
}

impl ToCategory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use levels persisted alongside the model instead of fitting
    pub fn from_levels(levels: Vec<ColumnLevels>) -> Self {
        Self { levels: Some(levels) }
    }

    pub fn levels(&self) -> Option<&[ColumnLevels]> {
        self.levels.as_deref()
    }

    pub fn levels_of(&self, column: &str) -> Option<&[String]> {
        self.levels
            .as_ref()?
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, levels)| levels.as_slice())
    }

    fn encode(column: &str, levels: &[String], value: &FeatureValue) -> Result<FeatureValue, PipelineError> {
        let text = match value {
            FeatureValue::Missing => return Ok(FeatureValue::Missing),
            other => other.as_text().ok_or_else(|| PipelineError::UnknownCategory {
                column: column.to_string(),
                value: other.display(),
            })?,
        };

        levels
            .iter()
            .position(|level| level == text)
            .map(|code| FeatureValue::Category {
                level: text.to_string(),
                code: code as u32,
            })
            .ok_or_else(|| PipelineError::UnknownCategory {
                column: column.to_string(),
                value: text.to_string(),
            })
    }
}

impl Transform for ToCategory {
    fn name(&self) -> &'static str {
        "to_category"
    }

    fn fit(&mut self, frame: &FeatureFrame) -> Result<(), PipelineError> {
        let mut learned = Vec::new();

        for name in frame.columns() {
            let values: Vec<&FeatureValue> = frame.column(name)?.collect();
            let textual = values
                .iter()
                .all(|v| v.is_textual() || matches!(v, FeatureValue::Missing))
                && values.iter().any(|v| v.is_textual());
            if !textual {
                continue;
            }

            let mut levels: Vec<String> = values
                .iter()
                .filter_map(|v| v.as_text())
                .map(str::to_string)
                .collect();
            levels.sort();
            levels.dedup();
            learned.push((name.clone(), levels));
        }

        log::debug!(
            "Learned categorical levels for {:?}",
            learned.iter().map(|(n, l)| (n.as_str(), l.len())).collect::<Vec<_>>()
        );
        self.levels = Some(learned);
        Ok(())
    }

    fn transform(&self, mut frame: FeatureFrame) -> Result<FeatureFrame, PipelineError> {
        let levels = self.levels.as_ref().ok_or(PipelineError::NotFitted("to_category"))?;

        for (column, column_levels) in levels {
            frame.try_map_column(column, |value| Self::encode(column, column_levels, value))?;
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> FeatureFrame {
        let mut frame = FeatureFrame::new(["profession", "rarity"]);
        for (p, r) in [("mining", 1.0), ("fishing", 2.0), ("mining", 0.0), ("gardening", 4.0)] {
            frame.push_row(vec![p.into(), r.into()]).unwrap();
        }
        frame
    }

    #[test]
    fn test_fit_learns_sorted_levels_for_text_only() {
        let mut step = ToCategory::new();
        step.fit(&frame()).unwrap();

        assert_eq!(
            step.levels_of("profession").unwrap(),
            &["fishing".to_string(), "gardening".to_string(), "mining".to_string()]
        );
        assert!(step.levels_of("rarity").is_none());
    }

    #[test]
    fn test_transform_encodes_codes() {
        let mut step = ToCategory::new();
        step.fit(&frame()).unwrap();
        let out = step.transform(frame()).unwrap();

        assert_eq!(
            out.get(0, "profession"),
            Some(&FeatureValue::Category { level: "mining".into(), code: 2 })
        );
        assert_eq!(out.get(1, "profession").and_then(|v| v.as_model_input()), Some(0.0));
        assert_eq!(out.get(3, "rarity"), Some(&FeatureValue::Number(4.0)));
    }

    #[test]
    fn test_already_categorical_is_recoded() {
        let step = ToCategory::from_levels(vec![(
            "profession".into(),
            vec!["fishing".into(), "foraging".into(), "gardening".into(), "mining".into()],
        )]);
        let mut input = FeatureFrame::new(["profession"]);
        input
            .push_row(vec![FeatureValue::Category { level: "mining".into(), code: 2 }])
            .unwrap();

        let out = step.transform(input).unwrap();
        assert_eq!(out.get(0, "profession").and_then(|v| v.as_model_input()), Some(3.0));
    }

    #[test]
    fn test_unknown_level_fails() {
        let step = ToCategory::from_levels(vec![("profession".into(), vec!["mining".into()])]);
        let err = step.transform(frame()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnknownCategory { ref column, ref value } if column == "profession" && value == "fishing"
        ));
    }

    #[test]
    fn test_missing_stays_missing() {
        let step = ToCategory::from_levels(vec![("profession".into(), vec!["mining".into()])]);
        let mut input = FeatureFrame::new(["profession"]);
        input.push_row(vec![FeatureValue::Missing]).unwrap();
        let out = step.transform(input).unwrap();
        assert_eq!(out.get(0, "profession"), Some(&FeatureValue::Missing));
    }
}
