//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the model input schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! The order is the column order the preprocessing pipeline produces:
//! the raw tavern columns minus `timeStamp`, then `buyWeekDay`/`buyHour`
//! from the date transform, then `classRank` from the class rank transform.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order the model consumes them
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Hero identity (0-1) ===
    "rarity",       // 0: Rarity tier, 0 = common .. 4 = mythic
    "generation",   // 1: Summoning generation

    // === Classes & stats (2-5, categorical) ===
    "mainClass",    // 2
    "subClass",     // 3
    "statBoost1",   // 4
    "statBoost2",   // 5

    // === Profession (6, categorical) ===
    "profession",   // 6

    // === Summons (7-8) ===
    "summons",      // 7: Remaining summons
    "maxSummons",   // 8: Total summons

    // === Sale time (9-10) ===
    "buyWeekDay",   // 9: Monday = 0
    "buyHour",      // 10: 0-23 UTC

    // === Derived (11, categorical) ===
    "classRank",    // 11: Basic / Advanced / Elite / Exalted
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 12;

/// Columns that reach the model as categorical codes
pub const CATEGORICAL_FEATURES: &[&str] = &[
    "mainClass",
    "subClass",
    "statBoost1",
    "statBoost2",
    "profession",
    "classRank",
];

/// Raw columns as they come out of the feature builder (before the pipeline)
pub const RAW_COLUMNS: &[&str] = &[
    "rarity",
    "generation",
    "mainClass",
    "subClass",
    "statBoost1",
    "statBoost2",
    "profession",
    "summons",
    "maxSummons",
    "timeStamp",
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of a list of feature names
pub fn hash_names<S: AsRef<str>>(version: u8, names: &[S]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[version]);

    for name in names {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Compute CRC32 hash of the feature layout
/// Used to detect model/layout mismatches at load time
pub fn layout_hash() -> u32 {
    hash_names(FEATURE_VERSION, FEATURE_LAYOUT)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a model's feature names don't match the layout
#[derive(Debug, Clone, thiserror::Error)]
#[error("Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got hash {actual_hash:08x} for {actual_names:?}")]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_hash: u32,
    pub actual_names: Vec<String>,
}

/// Validate that a model was trained on the current layout
pub fn validate_feature_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();
    let incoming_hash = hash_names(FEATURE_VERSION, names);

    if incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_hash: incoming_hash,
            actual_names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

pub fn is_categorical(name: &str) -> bool {
    CATEGORICAL_FEATURES.contains(&name)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 12);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_feature_names_success() {
        assert!(validate_feature_names(FEATURE_LAYOUT).is_ok());
    }

    #[test]
    fn test_validate_feature_names_reordered() {
        let mut names: Vec<&str> = FEATURE_LAYOUT.to_vec();
        names.swap(0, 1);
        let err = validate_feature_names(&names).unwrap_err();
        assert_eq!(err.expected_hash, layout_hash());
        assert_eq!(err.actual_names[0], "generation");
    }

    #[test]
    fn test_validate_feature_names_missing() {
        let names = &FEATURE_LAYOUT[..FEATURE_COUNT - 1];
        assert!(validate_feature_names(names).is_err());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("rarity"), Some(0));
        assert_eq!(feature_index("profession"), Some(6));
        assert_eq!(feature_index("classRank"), Some(11));
        assert_eq!(feature_index("timeStamp"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("rarity"));
        assert_eq!(feature_name(11), Some("classRank"));
        assert_eq!(feature_name(100), None);
    }

    #[test]
    fn test_categorical_columns_are_in_layout() {
        for name in CATEGORICAL_FEATURES {
            assert!(feature_index(name).is_some(), "{} missing from layout", name);
        }
        assert!(is_categorical("profession"));
        assert!(!is_categorical("summons"));
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
