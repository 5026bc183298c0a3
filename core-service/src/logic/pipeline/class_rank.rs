//! Class rank: main class → Basic / Advanced / Elite / Exalted

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PipelineError, Transform};
use crate::logic::features::{FeatureFrame, FeatureValue};

pub const CLASS_COLUMN: &str = "mainClass";
pub const RANK_COLUMN: &str = "classRank";

/// Ordinal class tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassTier {
    Basic,
    Advanced,
    Elite,
    Exalted,
}

impl ClassTier {
    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "Priest" | "Warrior" | "Knight" | "Archer" | "Thief" | "Pirate" | "Monk" | "Wizard" => {
                Some(ClassTier::Basic)
            }
            "Paladin" | "DarkKnight" | "Ninja" | "Summoner" => Some(ClassTier::Advanced),
            "Dragoon" | "Sage" => Some(ClassTier::Elite),
            "DreadKnight" => Some(ClassTier::Exalted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassTier::Basic => "Basic",
            ClassTier::Advanced => "Advanced",
            ClassTier::Elite => "Elite",
            ClassTier::Exalted => "Exalted",
        }
    }
}

impl fmt::Display for ClassTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appends `classRank` derived from `mainClass`; the lookup table is fixed
#[derive(Debug, Default, Clone)]
pub struct ClassRankExtractor;

impl ClassRankExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for ClassRankExtractor {
    fn name(&self) -> &'static str {
        "class_rank"
    }

    fn fit(&mut self, _frame: &FeatureFrame) -> Result<(), PipelineError> {
        Ok(())
    }

    fn transform(&self, mut frame: FeatureFrame) -> Result<FeatureFrame, PipelineError> {
        let ranks = frame
            .column(CLASS_COLUMN)?
            .map(|value| {
                value
                    .as_text()
                    .and_then(ClassTier::from_class)
                    .map(|tier| FeatureValue::Text(tier.as_str().to_string()))
                    .ok_or_else(|| PipelineError::UnknownCategory {
                        column: CLASS_COLUMN.to_string(),
                        value: value.display(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        frame.set_column(RANK_COLUMN, ranks)?;
        Ok(frame)
    }
}
