//! Configuration module

use std::env;
use std::path::PathBuf;

use hero_price_core::constants::{DEFAULT_CHART_WIDTH, DEFAULT_MAX_DISPLAY};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directory holding the model, hero snapshot and analytics files
    pub artifact_dir: PathBuf,

    /// Waterfall rows when the request does not ask for a number
    pub max_display: usize,

    /// Chart width in pixels when the request does not ask for one
    pub chart_width: u32,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            artifact_dir: env::var("ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifact_dir),

            max_display: env::var("MAX_DISPLAY")
                .ok()
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_display),

            chart_width: env::var("CHART_WIDTH")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or(defaults.chart_width),

            environment: env::var("ENVIRONMENT")
                .unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            artifact_dir: PathBuf::from("data"),
            max_display: DEFAULT_MAX_DISPLAY,
            chart_width: DEFAULT_CHART_WIDTH,
            environment: "development".to_string(),
        }
    }
}
