//! Hero Features - raw hero record to model feature row
//!
//! Maps the attributes of a hero as exposed by the chain into the tavern
//! dataset columns the model was trained on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::frame::{FeatureFrame, FeatureValue};
use super::layout::RAW_COLUMNS;
use super::FeatureError;

/// Rarity tier names, indexed by the on-chain rarity value
pub const RARITY_NAMES: [&str; 5] = ["Common", "Uncommon", "Rare", "Legendary", "Mythic"];

/// Weekday names, Monday = 0 (same convention as the date transform)
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];

/// Hero attributes as returned by the hero API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroRecord {
    pub id: u64,
    pub rarity: u8,
    pub generation: u32,
    pub main_class: String,
    pub sub_class: String,
    #[serde(rename = "statboost1")]
    pub stat_boost1: String,
    #[serde(rename = "statboost2")]
    pub stat_boost2: String,
    pub profession: String,
    /// Summons already used
    pub summons: u32,
    pub max_summons: u32,
}

/// Remaining summons, always within `[0, max_summons]`
pub fn remaining_summons(used: u32, max_summons: u32) -> u32 {
    if used > max_summons {
        log::warn!(
            "Hero used {} summons out of {}, clamping remaining to 0",
            used,
            max_summons
        );
    }
    max_summons.saturating_sub(used)
}

impl HeroRecord {
    /// Build the single-row raw feature frame for this hero, stamped at `now`
    pub fn to_frame(&self, now: DateTime<Utc>) -> Result<FeatureFrame, FeatureError> {
        let mut frame = FeatureFrame::new(RAW_COLUMNS.iter().copied());
        let row = vec![
            FeatureValue::Number(self.rarity as f64),
            FeatureValue::Number(self.generation as f64),
            FeatureValue::Text(self.main_class.clone()),
            FeatureValue::Text(self.sub_class.clone()),
            FeatureValue::Text(self.stat_boost1.clone()),
            FeatureValue::Text(self.stat_boost2.clone()),
            FeatureValue::Text(self.profession.clone()),
            FeatureValue::Number(remaining_summons(self.summons, self.max_summons) as f64),
            FeatureValue::Number(self.max_summons as f64),
            FeatureValue::Timestamp(now),
        ];
        frame.push_row(row)?;
        Ok(frame)
    }
}

/// Human-readable view of the first row of a (transformed) feature frame
pub fn hero_to_display(frame: &FeatureFrame) -> Value {
    let mut out = Map::new();
    let Some(row) = frame.row(0) else {
        return Value::Object(out);
    };

    for (name, value) in frame.columns().iter().zip(row) {
        let shown = match (name.as_str(), value) {
            ("rarity", FeatureValue::Number(r)) => RARITY_NAMES
                .get(*r as usize)
                .map(|s| Value::String(s.to_string()))
                .unwrap_or_else(|| Value::from(*r)),
            ("buyWeekDay", FeatureValue::Number(d)) => WEEKDAY_NAMES
                .get(*d as usize)
                .map(|s| Value::String(s.to_string()))
                .unwrap_or_else(|| Value::from(*d)),
            (_, FeatureValue::Number(v)) if v.fract() == 0.0 => Value::from(*v as i64),
            (_, FeatureValue::Number(v)) => Value::from(*v),
            (_, other) => Value::String(other.display()),
        };
        out.insert(name.clone(), shown);
    }

    Value::Object(out)
}
