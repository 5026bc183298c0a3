//! Central Configuration Constants
//!
//! Single source of truth for artifact names and display defaults.

/// App name
pub const APP_NAME: &str = "DFK Heroes Price Prediction";

// ============================================
// Artifact files (relative to the artifact directory)
// ============================================

/// LightGBM `dump_model()` JSON
pub const MODEL_FILE: &str = "model.json";

/// Hero snapshot, one JSON object per line
pub const HEROES_FILE: &str = "heroes.jsonl";

pub const CROSS_VALIDATION_FILE: &str = "cross_validation.csv";

pub const PRICE_IMPACT_FILE: &str = "jewel_price_impact.csv";

/// Optional: tavern sales used for the dataset description
pub const TAVERN_FILE: &str = "tavern_data.csv";

/// Optional: JEWEL icon
pub const FAVICON_FILE: &str = "favicon.png";

/// Optional: `{ "files": { "<name>": "<sha256 hex>" } }`
pub const MANIFEST_FILE: &str = "manifest.json";

// ============================================
// Display defaults
// ============================================

/// Waterfall rows (individual features + "other features")
pub const DEFAULT_MAX_DISPLAY: usize = 10;

/// Chart width in pixels
pub const DEFAULT_CHART_WIDTH: u32 = 700;

pub const DEFAULT_CHART_HEIGHT: u32 = 250;
